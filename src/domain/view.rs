use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Every view the poller knows how to refresh.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Balance,
    BlockHeight,
    TxHistory,
    BootstrapperProgress,
    ConsensusBuilderProgress,
}

/// DOM lookup used both for probing a view's presence and for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Id(&'static str),
    Class(&'static str),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Id(id) => write!(f, "#{id}"),
            Target::Class(class) => write!(f, ".{class}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    /// Form-encoded POST carrying `session_id` (and `page` when paging)
    PostForm,
}

/// Fixed remote endpoint of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

pub const SHUTDOWN_PATH: &str = "/shutdownServer";
pub const HEARTBEAT_PATH: &str = "/gui/heartbeat";
pub const EXPLORER_PATH: &str = "/gui/explorer";

const CACHE_KEY_MARKER: &str = "_stored";

impl ViewKind {
    pub fn all() -> impl Iterator<Item = ViewKind> {
        ViewKind::iter()
    }

    pub fn endpoint(self) -> Endpoint {
        match self {
            ViewKind::TxHistory => Endpoint { method: HttpMethod::PostForm, path: "/api/txHistoryPage" },
            ViewKind::Balance => Endpoint { method: HttpMethod::PostForm, path: "/gui/balance" },
            ViewKind::BlockHeight => Endpoint { method: HttpMethod::PostForm, path: "/gui/blockHeight" },
            ViewKind::BootstrapperProgress => {
                Endpoint { method: HttpMethod::Get, path: "/gui/bootstrapperProgress" }
            }
            ViewKind::ConsensusBuilderProgress => {
                Endpoint { method: HttpMethod::Get, path: "/gui/consensusBuilderProgress" }
            }
        }
    }

    /// Element whose presence means the view is mounted on this page.
    pub fn anchor(self) -> Target {
        match self {
            ViewKind::Balance => Target::Id("balance"),
            ViewKind::BlockHeight => Target::Class("block_height"),
            ViewKind::TxHistory => Target::Id("tx_history_page"),
            ViewKind::BootstrapperProgress => Target::Class("bootstrapper-progress"),
            ViewKind::ConsensusBuilderProgress => Target::Class("consensus-builder-progress"),
        }
    }

    /// Form submitted when the view reports a terminal state.
    pub fn transition_form(self) -> Option<&'static str> {
        match self {
            ViewKind::BlockHeight => Some("refreshForm"),
            ViewKind::BootstrapperProgress => Some("refreshBootstrapper"),
            ViewKind::ConsensusBuilderProgress => Some("refreshConsensusBuilder"),
            ViewKind::Balance | ViewKind::TxHistory => None,
        }
    }

    /// Onboarding progress views poll fast and stop once complete.
    pub fn is_progress(self) -> bool {
        matches!(self, ViewKind::BootstrapperProgress | ViewKind::ConsensusBuilderProgress)
    }

    /// Views painted from the local cache before the first fetch.
    pub fn hydrates_from_cache(self) -> bool {
        matches!(self, ViewKind::TxHistory)
    }

    pub fn accepts_page(self) -> bool {
        matches!(self, ViewKind::TxHistory)
    }

    pub fn cache_suffix(self) -> &'static str {
        match self {
            ViewKind::TxHistory => "TxHistoryPageLines",
            ViewKind::Balance => "Balance",
            ViewKind::BlockHeight => "BlockHeight",
            ViewKind::BootstrapperProgress => "BootstrapperProgress",
            ViewKind::ConsensusBuilderProgress => "ConsensusBuilderProgress",
        }
    }

    /// `{session}_stored{Suffix}`
    pub fn cache_key(self, session: &str) -> String {
        format!("{session}{CACHE_KEY_MARKER}{}", self.cache_suffix())
    }

    /// Splits a storage key into `(session, view)` when it follows the
    /// snapshot naming scheme.
    pub fn parse_cache_key(key: &str) -> Option<(&str, ViewKind)> {
        let (session, suffix) = key.split_once(CACHE_KEY_MARKER)?;
        if session.is_empty() {
            return None;
        }
        ViewKind::all().find(|view| view.cache_suffix() == suffix).map(|view| (session, view))
    }

    /// True for keys in the snapshot namespace, recognised or not.
    pub fn is_snapshot_key(key: &str) -> bool {
        key.contains(CACHE_KEY_MARKER)
    }
}
