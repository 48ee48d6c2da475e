use redis::Script;
use std::sync::LazyLock;

pub const WRITE_BATCH_SCRIPT_BODY: &str = include_str!("../../lua/write_batch.lua");

pub static WRITE_BATCH_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(WRITE_BATCH_SCRIPT_BODY));
