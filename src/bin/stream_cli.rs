use anyhow::{Context, Result};
use llm_playground::client::{GenerationClient, GenerationRequest, Model};
use llm_playground::config::PlaygroundConfig;
use llm_playground::playground::{Lane, ParamSet};
use std::env;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = PlaygroundConfig::from_env()?;

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        anyhow::bail!("usage: stream_cli <prompt>");
    }

    let params = ParamSet::lane_defaults(Lane::A);
    let request = GenerationRequest {
        prompt,
        model: Model::Tinyllama,
        temperature: params.temperature,
        top_p: params.top_p,
        max_tokens: params.max_tokens,
    };

    let client = GenerationClient::new(config.backend_url);
    println!("🎯 Streaming from {}", client.base_url());

    let mut stdout = std::io::stdout();
    let mut write_err: Option<io::Error> = None;
    client
        .stream_generate(&request, |chunk| {
            if write_err.is_some() {
                return;
            }
            if let Err(e) = write!(stdout, "{chunk}").and_then(|()| stdout.flush()) {
                write_err = Some(e);
            }
        })
        .await?;

    if let Some(e) = write_err {
        return Err(e).context("writing to stdout");
    }

    println!();
    Ok(())
}
