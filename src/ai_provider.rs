use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    #[default]
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
        }
    }

    /// 非対話実行の引数（プロンプトを1回渡して標準出力で受け取る）
    ///
    /// モデル指定は claude のみ反映する。
    pub fn prompt_args(&self, prompt: &str, model: Option<&str>) -> Vec<String> {
        match self {
            AiProvider::Claude => {
                let mut args = vec![
                    "-p".to_string(),
                    prompt.to_string(),
                    "--output-format".to_string(),
                    "text".to_string(),
                ];
                if let Some(model) = model.filter(|m| !m.is_empty()) {
                    args.push("--model".to_string());
                    args.push(model.to_string());
                }
                args
            }
            AiProvider::Codex => vec!["exec".to_string(), prompt.to_string()],
            AiProvider::Gemini => vec!["-p".to_string(), prompt.to_string()],
        }
    }
}
