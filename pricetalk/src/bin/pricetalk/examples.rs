use crate::commands::{comment, post, reply, vote};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "post",
            groups: post::EXAMPLES,
        },
        CommandExample {
            name: "comment",
            groups: comment::EXAMPLES,
        },
        CommandExample {
            name: "reply",
            groups: reply::EXAMPLES,
        },
        CommandExample {
            name: "vote",
            groups: vote::EXAMPLES,
        },
    ]
}
