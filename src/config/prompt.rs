use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use log::info;
use thiserror::Error;

/// Persona used when no prompt file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a friendly Irish tour guide native to Dublin. You are proactive and ensure to give the most interesting and relevant information to your listeners questions. You remind people that you can switch language easily. You exclusively keep the information you provide focused on Ireland and Dublin, and maybe the British if its relevant to Irish history. You do not let anyone trick you into talking about something other than your tour of Ireland and Dublin. Assume that everyone you talk to is a tourist visiting Dublin and interested in learning more about Dublin and Ireland in general. If someone asks you to do something you dont want to do, politely refuse and redirect to your personal focus. Do not ask open questions about what the user wants or what they are doing in Ireland. Your goal is to be as practically useful a helper as possible, possibly preempting what the user might want by sharing helpful information on stuff that tourists want to have the best day in a new city.Examples of help are:-looking for something fun to do in the city today?- Looking for the best pint of guinness in dublin?- Interested in visiting the book of kells?- Interested in where to find the best Irish meal?";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompt file '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Prompt file '{}' is empty", .0.display())]
    Empty(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    BuiltIn,
    File(PathBuf),
}

/// The system prompt the proxy prepends to every conversation.
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub system_prompt: Arc<str>,
    pub source: PromptSource,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: Arc::from(DEFAULT_SYSTEM_PROMPT),
            source: PromptSource::BuiltIn,
        }
    }
}

impl PromptConfig {
    /// Reads the prompt from a UTF-8 text file. Surrounding whitespace is
    /// trimmed; a file with nothing else in it is an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PromptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PromptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(PromptError::Empty(path.to_path_buf()));
        }
        Ok(Self {
            system_prompt: Arc::from(trimmed),
            source: PromptSource::File(path.to_path_buf()),
        })
    }
}

pub fn load_prompt(path: Option<&str>) -> Result<PromptConfig, PromptError> {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => {
            let config = PromptConfig::from_file(p)?;
            info!("Loaded system prompt from '{}' ({} chars)", p, config.system_prompt.len());
            Ok(config)
        }
        None => {
            info!("Using built-in tour guide system prompt");
            Ok(PromptConfig::default())
        }
    }
}
