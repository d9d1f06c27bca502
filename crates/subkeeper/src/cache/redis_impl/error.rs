use subkeeper_core::cache::CacheError;

/// Sorts a Redis failure into the cache error taxonomy.
///
/// Anything that means the server could not be reached is
/// `ConnectionFailed`; a command the server answered with an error is
/// `OperationFailed`.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    let unreachable = err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || err.is_io_error();

    if unreachable {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}
