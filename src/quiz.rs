use crate::logger;
use crate::models::{GatewayRequest, GatewayResponse, Task, TaskKind, Verdict};
use crate::progress::ProgressStore;
use std::sync::mpsc::Sender;

/// User-facing message when a regeneration round trip yields no tasks.
pub const EMPTY_BATCH_MESSAGE: &str = "AI nie zwróciło żadnych zadań. Spróbuj ponownie.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// A regeneration request is in flight.
    Loading,
    /// Valid terminal presentation state: the batch is empty and only an
    /// explicit regenerate can leave it.
    NoTasks,
    /// Current task presented, waiting for an answer.
    Answering,
    /// Answer graded; verdict available until `advance`.
    Checked,
    Finished,
}

/// Scored quiz session over one curriculum section.
///
/// A plain state machine: answering and grading are synchronous, while
/// `regenerate` emits a generation-stamped request and absorbs the batch
/// later through `apply_response`. One engine exists per section and is
/// replaced wholesale when the section changes.
pub struct QuizEngine {
    section_id: String,
    topic: String,
    tasks: Vec<Task>,
    cursor: usize,
    score: u32,
    pending_answer: Option<String>,
    verdict: Option<Verdict>,
    phase: QuizPhase,
    /// Phase to fall back to when a regeneration fails in transit.
    resume_phase: QuizPhase,
    error: Option<String>,
    generation: u64,
    progress_written: bool,
    request_tx: Option<Sender<GatewayRequest>>,
    progress: Option<Box<dyn ProgressStore>>,
}

impl QuizEngine {
    pub fn new(
        section_id: impl Into<String>,
        topic: impl Into<String>,
        tasks: Vec<Task>,
        request_tx: Option<Sender<GatewayRequest>>,
        progress: Option<Box<dyn ProgressStore>>,
    ) -> Self {
        let phase = if tasks.is_empty() {
            QuizPhase::NoTasks
        } else {
            QuizPhase::Answering
        };

        Self {
            section_id: section_id.into(),
            topic: topic.into(),
            tasks,
            cursor: 0,
            score: 0,
            pending_answer: None,
            verdict: None,
            phase,
            resume_phase: phase,
            error: None,
            generation: 0,
            progress_written: false,
            request_tx,
            progress,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn pending_answer(&self) -> Option<&str> {
        self.pending_answer.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_task(&self) -> Option<&Task> {
        match self.phase {
            QuizPhase::Answering | QuizPhase::Checked => self.tasks.get(self.cursor),
            _ => None,
        }
    }

    /// Grades the answer against the current task. Multiple choice demands
    /// the exact option string; free-text kinds compare trimmed and
    /// case-insensitive. Empty input is a no-op, not a wrong answer.
    pub fn submit_answer(&mut self, answer: &str) {
        if self.phase != QuizPhase::Answering || answer.trim().is_empty() {
            return;
        }
        let Some(task) = self.tasks.get(self.cursor) else {
            return;
        };

        let is_correct = match task.kind {
            TaskKind::MultipleChoice => answer == task.expected_answer,
            _ => {
                answer.trim().to_lowercase() == task.expected_answer.trim().to_lowercase()
            }
        };

        if is_correct {
            self.score += 1;
        }
        self.verdict = Some(Verdict {
            is_correct,
            explanation: task.explanation.clone(),
        });
        self.pending_answer = Some(answer.to_string());
        self.phase = QuizPhase::Checked;
    }

    /// Moves past a graded answer: next task, or Finished after the last
    /// one. Completing a pass records `{section_id, score}` exactly once.
    pub fn advance(&mut self) {
        if self.phase != QuizPhase::Checked {
            return;
        }

        self.pending_answer = None;
        self.verdict = None;

        if self.cursor + 1 < self.tasks.len() {
            self.cursor += 1;
            self.phase = QuizPhase::Answering;
        } else {
            self.cursor = self.tasks.len();
            self.phase = QuizPhase::Finished;
            self.write_progress();
        }
    }

    /// Replays the same batch from the top. Legal only once finished; the
    /// next completed pass records progress again.
    pub fn restart(&mut self) {
        if self.phase != QuizPhase::Finished {
            return;
        }

        self.cursor = 0;
        self.score = 0;
        self.pending_answer = None;
        self.verdict = None;
        self.error = None;
        self.progress_written = false;
        self.phase = if self.tasks.is_empty() {
            QuizPhase::NoTasks
        } else {
            QuizPhase::Answering
        };
    }

    /// Requests a fresh AI batch for this section's topic. Single-flight: a
    /// second call while one is pending is ignored.
    pub fn regenerate(&mut self) {
        if self.phase == QuizPhase::Loading {
            return;
        }

        self.generation += 1;
        self.resume_phase = self.phase;
        self.error = None;
        self.phase = QuizPhase::Loading;

        if let Some(ref tx) = self.request_tx {
            tx.send(GatewayRequest::TaskBatch {
                generation: self.generation,
                topic: self.topic.clone(),
            })
            .ok();
        }
    }

    /// Absorbs a worker response. Batches stamped with an old generation
    /// are discarded on arrival; only the task-batch variant is ours.
    pub fn apply_response(&mut self, response: GatewayResponse) {
        let GatewayResponse::TaskBatch { generation, result } = response else {
            return;
        };
        if generation != self.generation || self.phase != QuizPhase::Loading {
            logger::log("Discarding stale task batch");
            return;
        }

        match result {
            Ok(tasks) if tasks.is_empty() => {
                self.tasks.clear();
                self.reset_pass();
                self.phase = QuizPhase::NoTasks;
                self.error = Some(EMPTY_BATCH_MESSAGE.to_string());
            }
            Ok(tasks) => {
                self.tasks = tasks;
                self.reset_pass();
                self.phase = QuizPhase::Answering;
                self.error = None;
            }
            Err(e) => {
                // Prior tasks, cursor and score stay intact; retry is an
                // explicit user action.
                self.error = Some(format!("Błąd generowania zadań: {}", e));
                self.phase = self.resume_phase;
            }
        }
    }

    fn reset_pass(&mut self) {
        self.cursor = 0;
        self.score = 0;
        self.pending_answer = None;
        self.verdict = None;
        self.progress_written = false;
    }

    fn write_progress(&mut self) {
        if self.progress_written {
            return;
        }
        self.progress_written = true;

        if let Some(ref mut store) = self.progress
            && let Err(e) = store.record_completion(&self.section_id, self.score)
        {
            // Eventually-durable collaborator: log and keep going.
            logger::log(&format!(
                "Failed to record progress for {}: {}",
                self.section_id, e
            ));
        }
    }
}
