//! Typed client for the LocalAgent backend API.
//!
//! `ApiClient` carries the transport concerns (base URL, bearer token,
//! retries, the tool-call gate); the `services` modules are thin typed
//! wrappers over the resource routes.

pub mod client;
pub mod config;
pub mod services;

pub use client::{
    API_PREFIX, ApiClient, ApiClientConfig, ApiError, DEFAULT_REQUEST_ATTEMPTS, DEFAULT_TIMEOUT_MS,
};
pub use config::{
    ConfigError, DEFAULT_BASE_URL, ResolvedBaseUrl, clear_token, load_token, resolve_base_url,
    resolve_ws_url, store_token, token_file_path,
};
pub use services::{
    AgentService, AuthService, CodeRunnerService, DataAnalyzerService, ExecutorService,
    FileProcessorService, NetworkService, PlannerService, SystemOperatorService, SystemService,
    TaskService, ToolService,
};
