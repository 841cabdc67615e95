//! Binding of read-scope predicates into dynamic queries.

/// Binds every value of a [`ScopePredicate`](scholaris_policy::ScopePredicate)
/// onto a `query_as` / `query_scalar` builder, in placeholder order.
macro_rules! bind_scope {
    ($query:expr, $predicate:expr) => {{
        let mut query = $query;
        for bind in &$predicate.binds {
            query = match bind {
                scholaris_policy::ScopeBind::School(id) => query.bind(id.get()),
                scholaris_policy::ScopeBind::User(id) => query.bind(id.get()),
                scholaris_policy::ScopeBind::Classes(ids) => {
                    query.bind(ids.iter().map(|c| c.get()).collect::<Vec<i64>>())
                }
            };
        }
        query
    }};
}

pub(crate) use bind_scope;
