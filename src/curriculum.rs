use crate::models::{Task, TaskKind};
use rand::seq::SliceRandom;

/// Conjugation summary shown in the theory panel.
#[derive(Debug, Clone)]
pub struct VerbForms {
    pub affirmative: String,
    pub negative: String,
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone)]
pub struct IrregularVerb {
    pub v1: String,
    pub v2: String,
    pub v3: String,
    pub translation: String,
}

/// One curriculum section: theory plus the seed material for the engines.
/// Read-only; the engines never mutate curriculum data.
#[derive(Debug, Clone)]
pub struct GrammarSection {
    pub id: String,
    pub title: String,
    pub theory: String,
    pub usage: Vec<String>,
    pub forms: VerbForms,
    pub examples: Vec<String>,
    pub initial_tasks: Vec<Task>,
    pub flashcards: Vec<Flashcard>,
    pub irregular_verbs: Vec<IrregularVerb>,
}

/// Simple review deck over a section's flashcards.
#[derive(Debug, Clone)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    position: usize,
    showing_back: bool,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            position: 0,
            showing_back: false,
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::thread_rng());
        self.position = 0;
        self.showing_back = false;
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.position)
    }

    pub fn is_showing_back(&self) -> bool {
        self.showing_back
    }

    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.showing_back = !self.showing_back;
        }
    }

    pub fn next(&mut self) {
        if self.position + 1 < self.cards.len() {
            self.position += 1;
            self.showing_back = false;
        }
    }

    pub fn prev(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.showing_back = false;
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

pub fn section_by_id<'a>(sections: &'a [GrammarSection], id: &str) -> Option<&'a GrammarSection> {
    sections.iter().find(|s| s.id == id)
}

fn mc(id: &str, question: &str, options: &[&str], answer: &str, explanation: &str) -> Task {
    Task {
        id: id.to_string(),
        kind: TaskKind::MultipleChoice,
        prompt: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        expected_answer: answer.to_string(),
        explanation: explanation.to_string(),
    }
}

fn blank(id: &str, question: &str, answer: &str, explanation: &str) -> Task {
    Task {
        id: id.to_string(),
        kind: TaskKind::FillBlank,
        prompt: question.to_string(),
        options: vec![],
        expected_answer: answer.to_string(),
        explanation: explanation.to_string(),
    }
}

fn card(id: &str, front: &str, back: &str) -> Flashcard {
    Flashcard {
        id: id.to_string(),
        front: front.to_string(),
        back: back.to_string(),
    }
}

fn verb(v1: &str, v2: &str, v3: &str, translation: &str) -> IrregularVerb {
    IrregularVerb {
        v1: v1.to_string(),
        v2: v2.to_string(),
        v3: v3.to_string(),
        translation: translation.to_string(),
    }
}

fn forms(affirmative: &str, negative: &str, question: &str) -> VerbForms {
    VerbForms {
        affirmative: affirmative.to_string(),
        negative: negative.to_string(),
        question: question.to_string(),
    }
}

/// The built-in grammar handbook. Theory and explanations are in Polish,
/// examples in English, matching the target audience.
pub fn builtin_sections() -> Vec<GrammarSection> {
    vec![
        GrammarSection {
            id: "present-simple".to_string(),
            title: "Present Simple".to_string(),
            theory: "Czas teraźniejszy prosty. Używamy go do opisywania stałych sytuacji, nawyków oraz faktów naukowych.\n\nBUDOWA:\n- Twierdzenia: Podmiot + czasownik (w 3 os. l.poj. końcówka -s/-es).\n- Przeczenia: don't / doesn't + forma podstawowa.\n- Pytania: Do / Does + podmiot + forma podstawowa.\n\nSŁOWA KLUCZE: always, usually, often, sometimes, rarely, never, every day, on Mondays.".to_string(),
            usage: vec![
                "Rutyny i nawyki".to_string(),
                "Prawa natury".to_string(),
                "Harmonogramy".to_string(),
                "Stałe sytuacje".to_string(),
            ],
            forms: forms(
                "I/You play | He/She/It plays",
                "I don't play | He doesn't play",
                "Do you play? | Does he play?",
            ),
            examples: vec![
                "She walks to work.".to_string(),
                "They don't like pizza.".to_string(),
                "Do you speak English?".to_string(),
                "Water boils at 100°C.".to_string(),
            ],
            initial_tasks: vec![
                mc(
                    "ps-q1",
                    "She ___ to school every day.",
                    &["walk", "walks", "walking", "walked"],
                    "walks",
                    "W 3 osobie liczby pojedynczej dodajemy końcówkę -s.",
                ),
                blank(
                    "ps-q2",
                    "They ___ (not/like) vegetables.",
                    "don't like",
                    "Dla 'They' używamy operatora 'don't'.",
                ),
            ],
            flashcards: vec![
                card("ps-f1", "Końcówka dla 'He/She/It'?", "-s lub -es"),
                card("ps-f2", "Operator w pytaniu dla 'I'?", "Do"),
            ],
            irregular_verbs: vec![],
        },
        GrammarSection {
            id: "present-continuous".to_string(),
            title: "Present Continuous".to_string(),
            theory: "Czas teraźniejszy ciągły. Opisuje czynności dziejące się w tej chwili lub plany na bliską przyszłość.\n\nBUDOWA: Podmiot + am/is/are + czasownik z -ing.".to_string(),
            usage: vec![
                "Czynności w tej chwili".to_string(),
                "Sytuacje tymczasowe".to_string(),
                "Plany na przyszłość".to_string(),
            ],
            forms: forms("I am playing", "I'm not playing", "Are you playing?"),
            examples: vec![
                "I'm reading now.".to_string(),
                "Are you listening?".to_string(),
                "He isn't working today.".to_string(),
            ],
            initial_tasks: vec![mc(
                "pc-q1",
                "Look! It ___ outside.",
                &["is raining", "rains", "rain"],
                "is raining",
                "Czynność dzieje się teraz (Look!).",
            )],
            flashcards: vec![card("pc-f1", "Budowa?", "be + verb-ing")],
            irregular_verbs: vec![],
        },
        GrammarSection {
            id: "past-simple".to_string(),
            title: "Past Simple".to_string(),
            theory: "Czas przeszły dokonany. Opisuje zakończone czynności w określonym czasie w przeszłości.".to_string(),
            usage: vec![
                "Zakończone czynności".to_string(),
                "Seria zdarzeń w przeszłości".to_string(),
            ],
            forms: forms("I played / went", "I didn't play", "Did you play?"),
            examples: vec![
                "I saw him yesterday.".to_string(),
                "Did you enjoy it?".to_string(),
                "They didn't come.".to_string(),
            ],
            initial_tasks: vec![mc(
                "pas-q1",
                "I ___ to London last year.",
                &["went", "go", "gone"],
                "went",
                "V2 dla 'go' to 'went'.",
            )],
            flashcards: vec![card("pas-f1", "Końcówka regularna?", "-ed")],
            irregular_verbs: vec![
                verb("be", "was/were", "been", "być"),
                verb("go", "went", "gone", "iść"),
                verb("see", "saw", "seen", "widzieć"),
            ],
        },
        GrammarSection {
            id: "present-perfect".to_string(),
            title: "Present Perfect".to_string(),
            theory: "Łączy przeszłość z teraźniejszością. Skupia się na skutku.".to_string(),
            usage: vec![
                "Doświadczenia życiowe".to_string(),
                "Skutek teraz".to_string(),
                "Czynność trwająca od przeszłości".to_string(),
            ],
            forms: forms("I have seen", "I haven't seen", "Have you seen?"),
            examples: vec![
                "I've lost my keys.".to_string(),
                "Have you ever been to Paris?".to_string(),
                "She has lived here for 5 years.".to_string(),
            ],
            initial_tasks: vec![mc(
                "pp-q1",
                "I ___ my homework already.",
                &["have finished", "finished", "has finished"],
                "have finished",
                "Already sugeruje Present Perfect.",
            )],
            flashcards: vec![card("pp-f1", "For czy Since dla '3 lat'?", "For")],
            irregular_verbs: vec![],
        },
        GrammarSection {
            id: "future-simple".to_string(),
            title: "Future Simple (Will)".to_string(),
            theory: "Używany do spontanicznych decyzji, obietnic i przewidywań.".to_string(),
            usage: vec![
                "Obietnice".to_string(),
                "Spontaniczne decyzje".to_string(),
                "Przewidywania".to_string(),
            ],
            forms: forms("I will help", "I won't help", "Will you help?"),
            examples: vec![
                "I'll call you.".to_string(),
                "I think it will rain.".to_string(),
                "I won't tell anyone.".to_string(),
            ],
            initial_tasks: vec![mc(
                "fs-q1",
                "I'm tired. I ___ to bed.",
                &["will go", "go", "went"],
                "will go",
                "Spontaniczna decyzja.",
            )],
            flashcards: vec![card("fs-f1", "Skrót od 'will not'?", "won't")],
            irregular_verbs: vec![],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_have_unique_ids() {
        let sections = builtin_sections();
        assert!(!sections.is_empty());

        let mut ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), sections.len());
    }

    #[test]
    fn test_seed_tasks_are_well_formed() {
        for section in builtin_sections() {
            for task in &section.initial_tasks {
                assert!(task.is_well_formed(), "bad seed task in {}", section.id);
                if task.kind == TaskKind::MultipleChoice {
                    assert!(
                        task.options.contains(&task.expected_answer),
                        "answer not among options in {}",
                        task.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_section_lookup() {
        let sections = builtin_sections();
        assert!(section_by_id(&sections, "past-simple").is_some());
        assert!(section_by_id(&sections, "no-such-section").is_none());
    }

    #[test]
    fn test_past_simple_carries_irregular_verbs() {
        let sections = builtin_sections();
        let past = section_by_id(&sections, "past-simple").unwrap();
        assert!(!past.irregular_verbs.is_empty());
        assert_eq!(past.irregular_verbs[0].v2, "was/were");
    }

    #[test]
    fn test_deck_navigation_and_flip() {
        let sections = builtin_sections();
        let ps = section_by_id(&sections, "present-simple").unwrap();
        let mut deck = FlashcardDeck::new(ps.flashcards.clone());

        assert_eq!(deck.len(), 2);
        assert!(!deck.is_showing_back());
        deck.flip();
        assert!(deck.is_showing_back());

        deck.next();
        assert!(!deck.is_showing_back());
        assert_eq!(deck.current().unwrap().id, "ps-f2");

        deck.next(); // already at the end
        assert_eq!(deck.current().unwrap().id, "ps-f2");

        deck.prev();
        assert_eq!(deck.current().unwrap().id, "ps-f1");
    }

    #[test]
    fn test_shuffle_keeps_all_cards() {
        let sections = builtin_sections();
        let ps = section_by_id(&sections, "present-simple").unwrap();
        let mut deck = FlashcardDeck::new(ps.flashcards.clone());

        deck.flip();
        deck.shuffle();
        assert_eq!(deck.len(), 2);
        assert!(!deck.is_showing_back());
        assert!(deck.current().is_some());
    }
}
