use reqwest::Url;
use velodrive_backend::SourceError;

const FOLDERS_SEGMENT: &str = "folders";

/// Accept either a bare Drive folder id or a sharing URL such as
/// `https://drive.google.com/drive/folders/<id>?usp=sharing`.
///
/// # Errors
/// Returns a configuration error for empty input or a URL without a folder id.
pub fn parse_folder_id(input: &str) -> Result<String, SourceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SourceError::config("folder", "folder id or URL is required"));
    }

    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return folder_id_from_url(input);
    }

    if let Some((_, rest)) = input.split_once("folders/") {
        let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
        return non_empty_id(id, input);
    }

    Ok(input.to_string())
}

fn folder_id_from_url(input: &str) -> Result<String, SourceError> {
    let url = Url::parse(input)
        .map_err(|error| SourceError::config("folder", format!("malformed folder URL {input}: {error}")))?;

    let id = url
        .path_segments()
        .and_then(|mut segments| {
            segments.find(|segment| *segment == FOLDERS_SEGMENT)?;
            segments.next()
        })
        .unwrap_or_default();

    non_empty_id(id, input)
}

fn non_empty_id(id: &str, input: &str) -> Result<String, SourceError> {
    if id.is_empty() {
        Err(SourceError::config(
            "folder",
            format!("malformed folder URL {input}: no folder id after 'folders/'"),
        ))
    } else {
        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::parse_folder_id;
    use velodrive_backend::SourceError;

    #[test]
    fn bare_id_is_returned_trimmed() {
        assert_eq!(
            parse_folder_id("  1AbCdEfGhIjK_lmn-OP  ").expect("bare id should parse"),
            "1AbCdEfGhIjK_lmn-OP"
        );
    }

    #[test]
    fn sharing_url_yields_id() {
        let id = parse_folder_id("https://drive.google.com/drive/folders/1AbCdEf?usp=sharing")
            .expect("sharing URL should parse");
        assert_eq!(id, "1AbCdEf");
    }

    #[test]
    fn url_with_account_prefix_and_trailing_slash() {
        let id = parse_folder_id("https://drive.google.com/drive/u/0/folders/XYZ123/")
            .expect("URL should parse");
        assert_eq!(id, "XYZ123");
    }

    #[test]
    fn scheme_less_folder_path() {
        let id = parse_folder_id("drive.google.com/drive/folders/XYZ123#frag")
            .expect("path should parse");
        assert_eq!(id, "XYZ123");
    }

    #[test]
    fn empty_input_is_config_error() {
        assert!(matches!(
            parse_folder_id("   "),
            Err(SourceError::Config { field: "folder", .. })
        ));
    }

    #[test]
    fn url_without_folder_segment_is_rejected() {
        assert!(matches!(
            parse_folder_id("https://drive.google.com/file/d/abc/view"),
            Err(SourceError::Config { field: "folder", .. })
        ));
    }

    #[test]
    fn url_with_empty_folder_id_is_rejected() {
        assert!(matches!(
            parse_folder_id("https://drive.google.com/drive/folders/"),
            Err(SourceError::Config { field: "folder", .. })
        ));
    }
}
