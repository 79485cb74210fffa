use anyhow::Result;
use log::debug;
use reqwest::Client;

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    download::{Downloader, HttpDownloader},
    http::HttpClient,
    layout::{InstallTarget, resolve_prefix},
    runtime::Runtime,
};

/// Sent with every request.
pub const USER_AGENT: &str = concat!(
    "inkoscribe-installer/",
    env!("INKOSCRIBE_INSTALLER_VERSION")
);

pub struct Config<R: Runtime, D: Downloader> {
    pub runtime: R,
    pub downloader: D,
    pub prefix: PathBuf,
}

impl<R: Runtime> Config<R, HttpDownloader> {
    pub fn new(runtime: R, prefix: Option<PathBuf>, timeout: Option<Duration>) -> Result<Self> {
        let prefix = resolve_prefix(&runtime, prefix)?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            debug!("Using request timeout of {:?}", timeout);
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let downloader = HttpDownloader::new(HttpClient::new(client));

        Ok(Self {
            runtime,
            downloader,
            prefix,
        })
    }
}

impl<R: Runtime, D: Downloader> Config<R, D> {
    pub fn target(&self) -> InstallTarget {
        InstallTarget::under(&self.prefix)
    }
}
