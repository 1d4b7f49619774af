use time::{Duration, OffsetDateTime};

use super::Note;

const WELCOME_BODY: &str = "This is your first note! You can create, edit, and delete notes \
using this app. Try creating a new note or editing this one.";

const MEETING_BODY: &str = "Discussed upcoming projects for Q1:\n- Implement new feature X\n\
- Optimize performance\n- User research for feature Y\n\nNext meeting: Monday 10 AM";

const SHOPPING_BODY: &str = "• Groceries\n• Milk\n• Bread\n• Eggs\n• Apples\n• Cheese\n\n\
• Hardware store\n• Light bulbs\n• Screws";

/// Starter notes, aged relative to `now`.
pub fn seed_notes(now: OffsetDateTime) -> Vec<Note> {
    [
        ("1", "Welcome to Notes App", WELCOME_BODY, Duration::days(1)),
        (
            "2",
            "Meeting Notes - Q1 Planning",
            MEETING_BODY,
            Duration::hours(1),
        ),
        ("3", "Shopping List", SHOPPING_BODY, Duration::minutes(30)),
    ]
    .into_iter()
    .map(|(id, title, content, age)| {
        let stamp = now - age;
        Note {
            id: id.to_owned(),
            title: title.to_owned(),
            content: content.to_owned(),
            created_at: stamp,
            updated_at: stamp,
        }
    })
    .collect()
}
