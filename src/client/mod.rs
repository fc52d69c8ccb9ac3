mod graphql;

pub use graphql::GraphClient;
