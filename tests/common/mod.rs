//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use saboteur::agent::Agent;
use saboteur::api::AppState;
use saboteur::config::Config;
use saboteur::error::AppResult;
use saboteur::interfaces::LIST_INTERFACES_CMD;
use saboteur::shell::{CommandResult, Shell};

/// Shell that records every command and answers from a script
#[derive(Default)]
pub struct ScriptedShell {
    commands: Mutex<Vec<String>>,
    interfaces: Vec<String>,
    fail_containing: Option<String>,
}

impl ScriptedShell {
    pub fn with_interfaces(interfaces: &[&str]) -> Self {
        Self {
            interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Commands containing `needle` exit with status 1
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_containing = Some(needle.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl Shell for ScriptedShell {
    async fn exec(&self, command: &str) -> AppResult<CommandResult> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(needle) = &self.fail_containing {
            if command.contains(needle.as_str()) {
                return Ok(CommandResult {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: "RTNETLINK answers: No such file or directory".to_string(),
                });
            }
        }

        let stdout = if command == LIST_INTERFACES_CMD {
            self.interfaces
                .iter()
                .map(|i| format!("{}\n", i))
                .collect()
        } else {
            String::new()
        };
        Ok(CommandResult {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

pub fn setup_app(shell: Arc<ScriptedShell>) -> Router {
    let config = Config::default();
    let agent = Agent::from_config(shell, &config);
    saboteur::create_router(AppState::new(agent))
}

pub async fn send(app: &Router, method: &str, body: Body) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri("/")
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

pub async fn post_json(app: &Router, payload: &Value) -> (StatusCode, Value) {
    let (status, body) = send(app, "POST", Body::from(payload.to_string())).await;
    (status, serde_json::from_slice(&body).unwrap())
}
