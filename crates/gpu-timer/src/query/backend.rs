/// Hardware elapsed-time query interface.
///
/// A query brackets GPU work between `begin_query` and `end_query`. The result
/// becomes available asynchronously and is polled with `is_result_available`;
/// none of these calls may block on the GPU.
pub trait QueryBackend {
    /// Opaque handle to one query object.
    type Query;

    /// Creates a new query object. Resource exhaustion here is fatal.
    fn create_query(&mut self) -> Self::Query;

    /// Starts the elapsed-time measurement bound to `query`.
    fn begin_query(&mut self, query: &mut Self::Query);

    /// Stops the measurement started on `query`.
    fn end_query(&mut self, query: &mut Self::Query);

    /// Non-blocking check for result availability.
    fn is_result_available(&mut self, query: &mut Self::Query) -> bool;

    /// Reads the raw result in nanoseconds.
    ///
    /// Only called after `is_result_available` returned `true`. Once this
    /// returns the query may be reused for a new measurement.
    fn result(&mut self, query: &mut Self::Query) -> u64;

    /// Called once at the start of every poll pass.
    ///
    /// Backends that need to pump device callbacks do it here.
    fn maintain(&mut self) {}
}
