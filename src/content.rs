//! Site content shown on the public pages

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub technologies: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub name: &'static str,
    pub skills: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// Immutable dataset shared by every request
#[derive(Debug, Clone)]
pub struct Content {
    pub projects: Vec<Project>,
    pub skills: Vec<SkillGroup>,
    pub services: Vec<Service>,
}

impl Content {
    pub fn builtin() -> Self {
        Self {
            projects: vec![
                Project {
                    id: 1,
                    title: "E-Commerce Platform",
                    description: "A full-stack e-commerce platform with payment integration",
                    image: "project1.jpg",
                    technologies: vec!["Python", "Flask", "PostgreSQL", "Stripe"],
                },
                Project {
                    id: 2,
                    title: "Social Media Dashboard",
                    description: "Real-time analytics dashboard for social media management",
                    image: "project2.jpg",
                    technologies: vec!["React", "Node.js", "MongoDB", "Chart.js"],
                },
                Project {
                    id: 3,
                    title: "Task Management App",
                    description: "Collaborative task management application with real-time updates",
                    image: "project3.jpg",
                    technologies: vec!["Vue.js", "Django", "Redis", "PostgreSQL"],
                },
            ],
            skills: vec![
                SkillGroup {
                    name: "Backend",
                    skills: vec!["Python", "Flask", "Django", "Node.js", "SQL"],
                },
                SkillGroup {
                    name: "Frontend",
                    skills: vec!["HTML5", "CSS3", "JavaScript", "React", "Vue.js"],
                },
                SkillGroup {
                    name: "Databases",
                    skills: vec!["PostgreSQL", "MongoDB", "MySQL", "Redis"],
                },
                SkillGroup {
                    name: "Tools",
                    skills: vec!["Git", "Docker", "Jenkins", "AWS", "Linux"],
                },
            ],
            services: vec![
                Service {
                    title: "Web Development",
                    description: "Full-stack web development with modern frameworks",
                    icon: "💻",
                },
                Service {
                    title: "API Development",
                    description: "RESTful and GraphQL API development",
                    icon: "⚙️",
                },
                Service {
                    title: "Database Design",
                    description: "Database architecture and optimization",
                    icon: "🗄️",
                },
                Service {
                    title: "Consulting",
                    description: "Technical consulting and code review",
                    icon: "📋",
                },
            ],
        }
    }

    /// Projects highlighted on the home page
    pub fn featured(&self) -> &[Project] {
        &self.projects[..self.projects.len().min(3)]
    }

    pub fn project(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}
