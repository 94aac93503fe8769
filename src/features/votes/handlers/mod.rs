pub mod vote_handler;
