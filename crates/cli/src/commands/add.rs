use std::path::Path;

use wardrobe_core::lifecycle::AddItemRequest;
use wardrobe_core::ports::ImageUpload;

use crate::commands::context::with_wardrobe;
use crate::commands::CommandResult;

const COMMAND: &str = "add";

/// Adds an item from an image on disk. Any of the three inputs may be absent; the
/// lifecycle reports which one is missing before touching either store.
pub fn run(image: Option<&Path>, type_label: &str, occasion_label: &str) -> CommandResult {
    let upload = match image.map(read_upload).transpose() {
        Ok(upload) => upload,
        Err(result) => return result,
    };

    let request = match AddItemRequest::from_labels(upload, type_label, occasion_label) {
        Ok(request) => request,
        Err(error) => return CommandResult::from_lifecycle(COMMAND, error),
    };

    with_wardrobe(COMMAND, |wardrobe| async move {
        match wardrobe.lifecycle.add_item(request).await {
            Ok(item) => CommandResult::success_with_items(
                COMMAND,
                format!("added {} ({})", item.item_type, item.occasion),
                &[item],
            ),
            Err(error) => CommandResult::from_lifecycle(COMMAND, error),
        }
    })
}

fn read_upload(path: &Path) -> Result<ImageUpload, CommandResult> {
    let bytes = std::fs::read(path).map_err(|error| {
        CommandResult::failure(
            COMMAND,
            "bad_request",
            format!("could not read image `{}`: {error}", path.display()),
            6,
        )
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageUpload { file_name, bytes })
}
