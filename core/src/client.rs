//! Entry point tying the transport, capabilities and resource handles together.
//!
//! # Design
//! `GerritClient` holds a `Transport` and a `Capabilities` set and nothing
//! else. It is never mutated after construction, so a single instance can be
//! shared across threads (behind an `Arc`) whenever the executor allows it.
//! Resource handles borrow the client and carry only their identity.

use crate::capabilities::{Capabilities, Operation};
use crate::config::GerritConfig;
use crate::error::Result;
use crate::http::HttpExecutor;
use crate::resources::{Accounts, Changes, Projects, Tools};
use crate::transport::Transport;

#[derive(Debug)]
pub struct GerritClient<E> {
    transport: Transport<E>,
    capabilities: Capabilities,
}

impl<E: HttpExecutor> GerritClient<E> {
    pub fn new(config: GerritConfig, executor: E) -> Self {
        Self {
            transport: Transport::new(config, executor),
            capabilities: Capabilities::default(),
        }
    }

    /// Restrict (or extend) the operations this client will perform.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn transport(&self) -> &Transport<E> {
        &self.transport
    }

    pub fn accounts(&self) -> Accounts<'_, E> {
        Accounts::new(self)
    }

    pub fn changes(&self) -> Changes<'_, E> {
        Changes::new(self)
    }

    pub fn projects(&self) -> Projects<'_, E> {
        Projects::new(self)
    }

    pub fn tools(&self) -> Tools<'_, E> {
        Tools::new(self)
    }

    pub(crate) fn require(&self, op: Operation) -> Result<()> {
        self.capabilities.require(op)
    }
}

#[cfg(feature = "ureq-client")]
pub use ureq_backed::Gerrit;

#[cfg(feature = "ureq-client")]
mod ureq_backed {
    use super::GerritClient;
    use crate::backends::UreqExecutor;
    use crate::config::GerritConfig;

    /// A client over the bundled blocking `ureq` executor.
    pub type Gerrit = GerritClient<UreqExecutor>;

    impl GerritClient<UreqExecutor> {
        /// Build a client that talks to the server with `ureq`, using the
        /// configured timeout.
        pub fn connect(config: GerritConfig) -> Self {
            let executor = UreqExecutor::new(config.timeout());
            GerritClient::new(config, executor)
        }
    }
}
