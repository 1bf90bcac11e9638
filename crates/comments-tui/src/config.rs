use std::env;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_url: String,
    pub task_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_url: env::var("COMMENTS_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            task_id: env::var("COMMENTS_TASK_ID").ok(),
        }
    }

    /// Command-line flags take precedence over the environment
    pub fn with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref url) = args.server_url {
            self.server_url = url.clone();
        }
        if let Some(ref task) = args.task_id {
            self.task_id = Some(task.clone());
        }
        self
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub task_id: Option<String>,
    pub server_url: Option<String>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--task" => {
                    parsed.task_id = Some(
                        args.next()
                            .ok_or("--task requires a task id argument")?,
                    );
                }
                "--server" => {
                    parsed.server_url = Some(
                        args.next()
                            .ok_or("--server requires a URL argument")?,
                    );
                }
                "--help" | "-h" => parsed.help = true,
                other => return Err(format!("Unknown argument: {}", other)),
            }
        }

        Ok(parsed)
    }

    pub fn usage() -> &'static str {
        "Usage: comments-tui [OPTIONS]\n\
         \n\
         Options:\n  \
           --task <ID>     Task whose comments to show (default: $COMMENTS_TASK_ID or 1)\n  \
           --server <URL>  API server (default: $COMMENTS_SERVER_URL or http://localhost:5000)\n  \
           --help, -h      Show this help message"
    }
}
