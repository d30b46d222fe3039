//! Open: a stat that also records what it learned on the file handle

use std::sync::Arc;

use super::base::OperationCore;
use super::kind::{Configured, Operation, OperationKind};
use super::stat::{StatInfo, StatKind, StatTarget};
use super::Progress;
use crate::error::{self, Error, Result};
use crate::file::{FileHandle, FileProperty};
use crate::transport::Transport;

pub type OpenOperation = Operation<OpenKind>;

#[derive(Debug)]
pub struct OpenKind {
    stat: StatKind,
    file: Arc<FileHandle>,
}

impl OpenKind {
    /// A cached URL already names the serving host, so it is treated as the origin.
    #[must_use]
    pub fn new(file: Arc<FileHandle>) -> Self {
        let target = StatTarget {
            dav: file.is_dav(),
            origin: file.is_cached_url(),
        };
        Self {
            stat: StatKind::new(target),
            file,
        }
    }

    #[must_use]
    pub fn file(&self) -> &Arc<FileHandle> {
        &self.file
    }
}

impl OperationKind for OpenKind {
    type Output = StatInfo;

    const NAME: &'static str = "open";

    fn configure(&mut self, core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured> {
        self.stat.configure(core, transport)
    }

    fn on_redirect(&mut self, core: &OperationCore, transport: &mut dyn Transport) {
        self.stat.on_redirect(core, transport);
    }

    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress> {
        self.stat.on_body(core, chunk)
    }

    fn pending_failure(&mut self) -> Option<Error> {
        self.stat.pending_failure()
    }

    fn finish(&mut self, core: &OperationCore, transport: &dyn Transport) -> Result<StatInfo> {
        if let Some(url) = transport.effective_url() {
            self.file.set_property(FileProperty::LastUrl, url.as_str());
        }
        if core.uses_x509() {
            self.file.set_property(FileProperty::UseX509Auth, "true");
        }
        if let Some(broker) = core.broker_url() {
            self.file.set_property(FileProperty::BrokerUrl, broker);
        }

        let (size, is_dir) = self.stat.stat_info(core)?;
        if is_dir {
            tracing::error!(
                target: "httpfs::operation",
                url = %core.url(),
                "Cannot open a directory"
            );
            return Err(error::is_directory("Cannot open a directory"));
        }
        if let Some(size) = size {
            self.file
                .set_property(FileProperty::ContentLength, size.to_string());
        }

        self.stat.finish(core, transport)
    }

    fn release(&mut self, transport: &mut dyn Transport) {
        self.stat.release(transport);
    }
}
