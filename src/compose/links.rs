/// Builds the console URL for a pipeline's overview page.
///
/// # Arguments
///
/// * `region` - Region the pipeline lives in (e.g., "us-east-1")
/// * `pipeline_name` - Pipeline name as it appears in events
///
/// # Returns
///
/// Clickable URL (e.g., <https://console.aws.amazon.com/codepipeline/home?region=us-east-1#/view/api-deploy>)
pub fn pipeline_console_url(region: &str, pipeline_name: &str) -> String {
    format!("https://console.aws.amazon.com/codepipeline/home?region={region}#/view/{pipeline_name}")
}

/// Renders a chat-markup link, `<url|label>`.
pub fn link(url: &str, label: &str) -> String {
    format!("<{url}|{label}>")
}

/// First 8 characters of a revision id.
pub fn short_revision(revision_id: &str) -> &str {
    revision_id
        .char_indices()
        .nth(8)
        .map_or(revision_id, |(idx, _)| &revision_id[..idx])
}
