//! Fixtures shared by the unit tests in this crate.

use voxboard_types::models::{Board, Feedback, User};
use voxboard_types::roles::GlobalRole;

use crate::Database;
use crate::feedback::NewFeedback;
use crate::users::NewUser;

pub(crate) fn new_user(email: &str) -> NewUser<'_> {
    NewUser {
        email,
        name: "Test User",
        picture: "",
        provider: "google",
        role: GlobalRole::User,
    }
}

pub(crate) fn user(db: &Database, email: &str, role: GlobalRole) -> User {
    db.create_user(&NewUser { role, ..new_user(email) }).unwrap()
}

pub(crate) fn board(db: &Database, name: &str, creator: &User) -> Board {
    db.create_board(name, creator.id).unwrap()
}

pub(crate) fn feedback(db: &Database, board: &Board) -> Feedback {
    db.create_feedback(&NewFeedback {
        board_id: board.id,
        title: "Dark mode",
        description: "Please add a dark theme",
        category_id: 1,
    })
    .unwrap()
}
