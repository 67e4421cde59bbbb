// Test Helpers Module - fixture database setup
//
// Shared setup functions for tests that drive a TestEntityManager: private
// in-memory databases, schema application and random fixture keys.

pub mod test_utils;

pub use test_utils::{
    random_id, setup_test_db, setup_test_db_with_schema, setup_test_entity_manager,
};
