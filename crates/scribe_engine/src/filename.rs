/// File extension used when persisting a transcript of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    match essence {
        "application/json" => "json",
        "text/plain" => "txt",
        "text/csv" => "csv",
        "text/vtt" => "vtt",
        "text/xml" | "application/xml" => "xml",
        "text/html" => "html",
        "text/praat-textgrid" => "TextGrid",
        _ => "dat",
    }
}

/// Filesystem-safe transcript filename for a job. The job id is opaque and
/// server-issued, so it is sanitized before it can name anything on disk.
pub fn transcript_filename(job_id: &str, mime_type: &str) -> String {
    format!(
        "transcript-{}.{}",
        sanitize_id(job_id),
        extension_for_mime(mime_type)
    )
}

fn sanitize_id(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "job".to_string();
    }
    if cleaned.len() > 80 {
        let mut end = 80;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
