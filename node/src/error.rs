use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] jury_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] jury_store_lmdb::LmdbError),

    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] jury_lifecycle::LifecycleError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] jury_rpc::RpcError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("database integrity check failed: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
