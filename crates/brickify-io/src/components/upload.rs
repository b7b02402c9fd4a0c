//! File picker with drag-and-drop.

use brickify_pipeline::SourceFormat;
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// Value of the `accept` attribute, e.g. `.png,.jpg,.jpeg`.
fn accept_list() -> String {
    SourceFormat::EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the raw file bytes and filename.
    on_upload: EventHandler<(Vec<u8>, String)>,
    /// Ignore new files, e.g. while a submission is running.
    #[props(default)]
    disabled: bool,
}

/// A drop zone with a file picker button.
///
/// Accepts PNG and JPEG. Reading the file happens here; decoding is
/// left to the caller so decode errors surface in one place.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    // Re-keying the input clears its value, so picking the same file
    // again still fires `onchange`.
    let mut picks = use_signal(|| 0u32);
    let disabled = props.disabled;

    let process_files = move |files: Vec<FileData>| async move {
        if disabled {
            return;
        }
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        if SourceFormat::from_file_name(&name).is_none() {
            error.set(Some(format!("Unsupported file type: {name}")));
            return;
        }
        match file.read_bytes().await {
            Ok(bytes) => {
                error.set(None);
                picks += 1;
                props.on_upload.call((bytes.to_vec(), name));
            }
            Err(e) => {
                log::warn!("reading {name} failed: {e}");
                error.set(Some(format!("Failed to read file: {e}")));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() { "drop-zone dragging" } else { "drop-zone" };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| dragging.set(false),
            ondrop: handle_drop,

            if let Some(ref err) = error() {
                p { class: "text-error", "{err}" }
            }

            label { class: if disabled { "btn btn-disabled" } else { "btn btn-primary" },
                for pick in std::iter::once(picks()) {
                    input {
                        key: "{pick}",
                        r#type: "file",
                        accept: accept_list(),
                        class: "hidden",
                        disabled,
                        onchange: handle_files,
                    }
                }
                "Choose Image"
            }
            p { class: "text-muted", "PNG, JPG or JPEG" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_list_covers_every_extension() {
        assert_eq!(accept_list(), ".png,.jpg,.jpeg");
    }
}
