//! List controller: owns the todo collection and mediates item events.

pub mod todo_list;
