/// Stable event ids emitted in the `event` field of session store traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStoreEvent {
    /// A Redis-protocol connection was opened.
    ClientConnected,
    /// A store was built from its resolved configuration.
    StoreInitialized,
    /// A lookup found a live session.
    SessionLoaded,
    /// A lookup found nothing (missing or expired).
    SessionMissed,
    /// A session payload and its TTL were written.
    SessionCommitted,
    /// A session key was deleted.
    SessionDeleted,
    /// One SCAN page was read during enumeration.
    ScanPageFetched,
    /// An enumeration walked every SCAN page.
    SessionsEnumerated,
    /// A context-free call was refused.
    LegacyCallRefused,
    /// A request was cut short by cancellation or deadline.
    OperationInterrupted,
    /// A settings file was parsed.
    SettingsLoaded,
    /// A settings file could not be read or parsed.
    SettingsFileIgnored,
    /// An environment override was rejected.
    SettingsEnvInvalid,
}

impl SessionStoreEvent {
    /// Every event, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::ClientConnected,
        Self::StoreInitialized,
        Self::SessionLoaded,
        Self::SessionMissed,
        Self::SessionCommitted,
        Self::SessionDeleted,
        Self::ScanPageFetched,
        Self::SessionsEnumerated,
        Self::LegacyCallRefused,
        Self::OperationInterrupted,
        Self::SettingsLoaded,
        Self::SettingsFileIgnored,
        Self::SettingsEnvInvalid,
    ];

    /// Dotted id written to the `event` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientConnected => "session.store.valkey.connected",
            Self::StoreInitialized => "session.store.initialized",
            Self::SessionLoaded => "session.store.find.hit",
            Self::SessionMissed => "session.store.find.miss",
            Self::SessionCommitted => "session.store.commit.succeeded",
            Self::SessionDeleted => "session.store.delete.succeeded",
            Self::ScanPageFetched => "session.store.all.scan_page",
            Self::SessionsEnumerated => "session.store.all.completed",
            Self::LegacyCallRefused => "session.store.legacy_call_refused",
            Self::OperationInterrupted => "session.store.context_interrupted",
            Self::SettingsLoaded => "session.store.settings.loaded",
            Self::SettingsFileIgnored => "session.store.settings.file_ignored",
            Self::SettingsEnvInvalid => "session.store.settings.env_invalid",
        }
    }
}
