//! Error types for constellation.
//!
//! This module provides error types for GPU initialization, the native viewer,
//! fragment fetching, configuration loading and page composition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("Surface exposes no usable texture format")]
    NoSurfaceFormat,
}

/// Errors that can occur when running the native viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

/// Errors produced by a [`FragmentSource`](crate::loader::FragmentSource).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Failed to load {path}: HTTP {status}")]
    Status { path: String, status: u16 },
    /// The request never produced a response.
    #[error("Failed to load {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Reading a fragment from disk failed.
    #[error("Failed to load {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The fragment path could not be resolved against the source root.
    #[error("Invalid fragment path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading a [`SiteConfig`](crate::config::SiteConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for the schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur when composing a page from disk.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Failed to read the page.
    #[error("Failed to read page {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The page path could not be turned into a location URL.
    #[error("Cannot derive a location for {0}")]
    Location(PathBuf),
    /// Building the HTTP client failed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
