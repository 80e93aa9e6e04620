use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Loads every `.md` file in `dir_path`, keyed by file stem.
pub fn load_prompts(dir_path: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();

    for entry in fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read prompts directory: {}", dir_path.display()))?
    {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let prompt_key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("Could not get file stem for prompt file")?
            .to_string();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;

        prompts.insert(prompt_key, content);
    }

    Ok(prompts)
}
