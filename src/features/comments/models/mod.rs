mod comment;

pub use comment::{Comment, CommentDeletion, CommentWithAuthor, NewComment};
