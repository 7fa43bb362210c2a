use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { model_id: String, source_ref: String },
    Exported { model_id: String, filename: String, size_bytes: u64 },
    Discovered { model_id: String, filename: String, size_bytes: u64 },
    Downloaded { model_id: String, filename: String, size_bytes: u64 },
    Uploaded { model_id: String, public_url: String },
    Failed { model_id: String, error: String },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

fn megabytes(size_bytes: u64) -> f64 {
    size_bytes as f64 / 1024.0 / 1024.0
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { model_id, source_ref } => {
                println!("[{model_id}] exporting {source_ref}");
            }
            ProgressEvent::Exported { model_id, filename, size_bytes } => {
                println!("[{model_id}] OK {filename} ({:.2} MB)", megabytes(size_bytes));
            }
            ProgressEvent::Discovered { model_id, filename, size_bytes } => {
                println!("[{model_id}] existing {filename} ({:.2} MB)", megabytes(size_bytes));
            }
            ProgressEvent::Downloaded { model_id, filename, size_bytes } => {
                println!("[{model_id}] downloaded {filename} ({:.2} MB)", megabytes(size_bytes));
            }
            ProgressEvent::Uploaded { model_id, public_url } => println!("[{model_id}] uploaded {public_url}"),
            ProgressEvent::Failed { model_id, error } => println!("[{model_id}] ERROR {error}"),
        }
    }
}
