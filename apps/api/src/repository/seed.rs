//! Demo records loaded into the in-memory repositories at startup.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::event::Event;
use crate::models::project::Project;
use crate::models::user::{ProjectRole, User};

/// The signed-in user until sessions exist.
pub const CURRENT_USER_ID: &str = "1";

pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400.png";
const PLACEHOLDER_AVATAR: &str = "https://placehold.co/100x100.png";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .earliest()
        .unwrap_or_default()
}

fn member(id: &str, name: &str, hint: &str, headline: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        avatar: PLACEHOLDER_AVATAR.to_string(),
        ai_hint: hint.to_string(),
        headline: headline.to_string(),
        email: email.to_string(),
        password: None,
        skills: Vec::new(),
        interests: Vec::new(),
        availability: String::new(),
        projects: Vec::new(),
    }
}

pub fn users() -> Vec<User> {
    let alex = User {
        avatar: "https://placehold.co/128x128.png".to_string(),
        password: Some("password123".to_string()),
        skills: strings(&[
            "React",
            "Node.js",
            "TypeScript",
            "Python",
            "UI/UX Design",
            "Figma",
            "Project Management",
        ]),
        interests: strings(&[
            "Artificial Intelligence",
            "Web3",
            "Sustainable Tech",
            "Mobile Development",
        ]),
        availability: "Available for part-time projects, 10-15 hours/week. Open to mentorship."
            .to_string(),
        projects: vec![
            ProjectRole {
                name: "NexusConnect Platform".to_string(),
                role: "Lead Developer".to_string(),
            },
            ProjectRole {
                name: "Portfolio Website".to_string(),
                role: "Developer".to_string(),
            },
        ],
        ..member(
            CURRENT_USER_ID,
            "Alex Doe",
            "person smiling",
            "Computer Science Student | Aspiring Full-Stack Developer",
            "test@example.com",
        )
    };

    let jane = User {
        skills: strings(&["Python", "TensorFlow", "scikit-learn"]),
        interests: strings(&["AI", "Data Science"]),
        availability: "Looking for summer internships".to_string(),
        ..member(
            "2",
            "Jane Doe",
            "woman smiling",
            "Data Science & ML Enthusiast",
            "jane@example.com",
        )
    };

    let john = User {
        skills: strings(&["HTML", "CSS", "JavaScript", "React"]),
        interests: strings(&["Web Dev", "Design"]),
        availability: "Open to freelance gigs".to_string(),
        ..member(
            "3",
            "John Smith",
            "man glasses",
            "Frontend Wizard | React & Vue",
            "john@example.com",
        )
    };

    let sam = User {
        skills: strings(&["Flutter", "Firebase", "Arduino"]),
        interests: strings(&["Mobile", "IoT"]),
        availability: "Available on weekends".to_string(),
        ..member(
            "4",
            "Sam Wilson",
            "person studio",
            "Mobile Dev & IoT Tinkerer",
            "sam@example.com",
        )
    };

    vec![alex, jane, john, sam]
}

fn project(id: &str, title: &str, description: &str, skills: &[&str], hint: &str) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        skills: strings(skills),
        image: PLACEHOLDER_IMAGE.to_string(),
        ai_hint: hint.to_string(),
    }
}

pub fn projects() -> Vec<Project> {
    vec![
        project(
            "p1",
            "Campus Ride-Sharing App",
            "A mobile app to connect students for carpooling to and from campus, reducing traffic and environmental impact.",
            &["React Native", "Firebase", "Node.js", "Geolocation"],
            "mobile app car",
        ),
        project(
            "p2",
            "Peer-to-Peer Tutoring Platform",
            "A platform where students can find or become tutors for various subjects, integrated with a scheduling and payment system.",
            &["Next.js", "Stripe", "PostgreSQL", "Prisma"],
            "students learning",
        ),
        project(
            "p3",
            "Smart Dorm Room Automation",
            "An IoT project to automate lighting, temperature, and security in dorm rooms using Raspberry Pi and custom sensors.",
            &["IoT", "Python", "Raspberry Pi", "C++"],
            "smart home",
        ),
        project(
            "p4",
            "AR Campus Tour Guide",
            "An augmented reality app that provides an interactive tour of the campus, highlighting key locations and historical facts.",
            &["Unity", "C#", "ARKit", "ARCore"],
            "augmented reality campus",
        ),
    ]
}

pub fn events() -> Vec<Event> {
    let event = |id: &str, title: &str, date, location: &str, description: &str, hint: &str| Event {
        id: id.to_string(),
        title: title.to_string(),
        date,
        location: location.to_string(),
        description: description.to_string(),
        image: PLACEHOLDER_IMAGE.to_string(),
        ai_hint: hint.to_string(),
    };

    vec![
        event(
            "e1",
            "NexusConnect Launch Party",
            at(2024, 9, 20, 18),
            "Student Union Building",
            "Join us to celebrate the launch of NexusConnect! Network with fellow students, find project partners, and enjoy free food and drinks.",
            "party celebration",
        ),
        event(
            "e2",
            "Advanced React Patterns Workshop",
            at(2024, 9, 28, 10),
            "Online via Zoom",
            "Deep dive into advanced React concepts like hooks, context, and performance optimization. Led by senior students.",
            "code workshop",
        ),
        event(
            "e3",
            "InnovateU Hackathon",
            at(2024, 10, 4, 17),
            "Engineering & CS Building",
            "A 48-hour hackathon focused on creating innovative solutions for campus life. Prizes, mentorship, and fun guaranteed!",
            "hackathon team",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_seeded_with_password() {
        let users = users();
        let current = users.iter().find(|u| u.id == CURRENT_USER_ID).unwrap();
        assert_eq!(current.name, "Alex Doe");
        assert!(current.password.is_some());
        assert!(current.skills.contains(&"Figma".to_string()));
    }

    #[test]
    fn test_event_dates_are_concrete() {
        let events = events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].date.to_rfc3339(), "2024-09-20T18:00:00+00:00");
    }
}
