use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// JSON file listing the characters, world settings, memos and chapters
    /// that can be referenced.
    #[arg(long = "catalog", short = 'c', value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Initial field value, including any `{{@::Kind::id}}` tokens.
    #[arg(long = "value", value_name = "TEXT")]
    pub value: Option<String>,

    /// Label drawn on the field border.
    #[arg(long)]
    pub label: Option<String>,

    /// Text shown dimmed while the field is empty.
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Help line drawn above the text.
    #[arg(long)]
    pub description: Option<String>,

    /// Mark the field as required.
    #[arg(long = "required", default_value_t = false)]
    pub required: bool,

    /// Character that opens the reference menu.
    #[arg(long = "trigger", short = 't', value_name = "CHAR")]
    pub trigger: Option<char>,
}
