use std::convert::Infallible;
use std::path::Path;
use std::process::Stdio;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tokio::process::Command;
use tracing::{error, info};

use crate::AppState;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json};

/// Platform audio player invocation for `sound`.
fn player_command(sound: &Path) -> Command {
    let sound = sound.display().to_string();

    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "wmplayer", "/play", "/close", &sound]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("afplay");
        cmd.arg(&sound);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", r#"aplay "$0" || paplay "$0""#, &sound]);
        cmd
    }
}

/// Run the player to completion. Product state never depends on this.
pub async fn play(sound: &Path) -> std::io::Result<bool> {
    let output = player_command(sound)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;
    if !output.status.success() {
        error!(
            "Beep sound error: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output.status.success())
}

/// POST /play-beep
pub async fn handle_play_beep(
    _req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let sound = Path::new(&state.config.paths.beep_sound);

    if !tokio::fs::try_exists(sound).await.unwrap_or(false) {
        return deliver_error_json(
            "SOUND_NOT_FOUND",
            "Beep sound file not found",
            StatusCode::NOT_FOUND,
        );
    }

    match play(sound).await {
        Ok(true) => {
            info!("Beep played");
            deliver_serialized_json(&json!({ "message": "Beep sound played!" }), StatusCode::OK)
        }
        Ok(false) => deliver_error_json(
            "SOUND_FAILED",
            "Error playing beep sound",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        Err(e) => {
            error!("Beep sound error: {}", e);
            deliver_error_json(
                "SOUND_FAILED",
                "Error playing beep sound",
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}
