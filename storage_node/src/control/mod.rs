pub mod nm_session;
