use crate::ai::ContentGateway;
use crate::logger;
use crate::models::{GatewayRequest, GatewayResponse};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Runs gateway calls off the UI thread. Components emit stamped
/// `GatewayRequest`s; the embedding event loop drains `GatewayResponse`s
/// and hands each one to the component that issued it. Requests are served
/// one at a time, which is all the single-flight components ever need.
pub fn spawn_gateway_worker(
    gateway: Arc<dyn ContentGateway>,
    response_tx: Sender<GatewayResponse>,
    request_rx: Receiver<GatewayRequest>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("grammar-guru::gateway_worker".to_string())
        .spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create gateway runtime");

            loop {
                let request = match request_rx.recv() {
                    Ok(request) => request,
                    Err(_) => {
                        // Channel disconnected, exit worker
                        logger::log("Worker channel disconnected, exiting");
                        break;
                    }
                };

                let response = match request {
                    GatewayRequest::TaskBatch { generation, topic } => {
                        logger::log(&format!("Worker: task batch for '{}'", topic));
                        let result = rt.block_on(gateway.generate_task_batch(&topic));
                        GatewayResponse::TaskBatch { generation, result }
                    }
                    GatewayRequest::SentencePair { generation } => {
                        logger::log("Worker: sentence pair");
                        let result = rt.block_on(gateway.generate_sentence_pair());
                        GatewayResponse::SentencePair { generation, result }
                    }
                    GatewayRequest::Analyze {
                        generation,
                        source,
                        reference,
                        candidate,
                    } => {
                        logger::log("Worker: translation analysis");
                        let result = rt.block_on(gateway.analyze(&source, &reference, &candidate));
                        GatewayResponse::Analysis { generation, result }
                    }
                    GatewayRequest::Translate { generation, text } => {
                        logger::log("Worker: analysis translation");
                        let result = rt.block_on(gateway.translate_text(&text));
                        GatewayResponse::Translation { generation, result }
                    }
                    GatewayRequest::Converse { context, message } => {
                        logger::log("Worker: tutor turn");
                        let result = rt.block_on(gateway.converse(&context, &message));
                        GatewayResponse::Reply { result }
                    }
                };

                if response_tx.send(response).is_err() {
                    logger::log("Worker response channel closed, exiting");
                    break;
                }
            }
        })
        .expect("Failed to spawn gateway worker thread")
}
