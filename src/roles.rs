//! Role-specific navigation and dashboard layout, as data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Parent,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Teacher, Role::Parent, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::Admin => "admin",
        }
    }

    pub fn profile(self) -> &'static RoleProfile {
        match self {
            Role::Student => &STUDENT,
            Role::Teacher => &TEACHER,
            Role::Parent => &PARENT,
            Role::Admin => &ADMIN,
        }
    }

    /// Parses a role name, falling back to `Student` for anything unknown.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown role `{}`", trimmed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    StatsOverview,
    UpcomingClasses,
    QuizScores,
    StudyRoom,
    AiAssistant,
    ClassRoster,
    PendingReviews,
    AiReports,
    ChildProgress,
    TeacherMessages,
    UserManagement,
    SystemHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleProfile {
    pub dashboard_title: &'static str,
    pub navigation: &'static [NavItem],
    pub widgets: &'static [Widget],
}

impl RoleProfile {
    /// The first navigation entry is always the role's dashboard.
    pub fn home(&self) -> &'static str {
        self.navigation.first().map_or("/", |item| item.href)
    }

    pub fn can_take_quizzes(&self) -> bool {
        self.widgets.contains(&Widget::QuizScores)
    }
}

const fn nav(name: &'static str, href: &'static str) -> NavItem {
    NavItem { name, href }
}

static STUDENT: RoleProfile = RoleProfile {
    dashboard_title: "Student Dashboard",
    navigation: &[
        nav("Dashboard", "/student"),
        nav("My Classes", "/student/classes"),
        nav("Study Room", "/student/study-room"),
        nav("Quizzes", "/student/quizzes"),
        nav("Progress", "/student/progress"),
        nav("Study Groups", "/student/groups"),
        nav("AI Assistant", "/student/ai-assistant"),
        nav("Calendar", "/student/calendar"),
    ],
    widgets: &[
        Widget::StatsOverview,
        Widget::UpcomingClasses,
        Widget::QuizScores,
        Widget::StudyRoom,
        Widget::AiAssistant,
    ],
};

static TEACHER: RoleProfile = RoleProfile {
    dashboard_title: "Teacher Dashboard",
    navigation: &[
        nav("Dashboard", "/teacher"),
        nav("My Classes", "/teacher/classes"),
        nav("Students", "/teacher/students"),
        nav("Content", "/teacher/content"),
        nav("Quizzes", "/teacher/quizzes"),
        nav("Analytics", "/teacher/analytics"),
        nav("Reports", "/teacher/reports"),
        nav("Calendar", "/teacher/calendar"),
    ],
    widgets: &[
        Widget::StatsOverview,
        Widget::ClassRoster,
        Widget::PendingReviews,
        Widget::AiReports,
    ],
};

static PARENT: RoleProfile = RoleProfile {
    dashboard_title: "Parent Dashboard",
    navigation: &[
        nav("Dashboard", "/parent"),
        nav("Children", "/parent/children"),
        nav("Progress", "/parent/progress"),
        nav("Reports", "/parent/reports"),
        nav("Communication", "/parent/communication"),
        nav("Resources", "/parent/resources"),
    ],
    widgets: &[
        Widget::ChildProgress,
        Widget::AiReports,
        Widget::TeacherMessages,
    ],
};

static ADMIN: RoleProfile = RoleProfile {
    dashboard_title: "Admin Dashboard",
    navigation: &[
        nav("Dashboard", "/admin"),
        nav("Users", "/admin/users"),
        nav("Classes", "/admin/classes"),
        nav("Analytics", "/admin/analytics"),
        nav("Settings", "/admin/settings"),
    ],
    widgets: &[
        Widget::StatsOverview,
        Widget::UserManagement,
        Widget::SystemHealth,
    ],
};

/// The signed-in user, passed explicitly to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        let user_id = user_id.into();
        Self {
            display_name: user_id.clone(),
            user_id,
            role,
        }
    }

    pub fn profile(&self) -> &'static RoleProfile {
        self.role.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_falls_back_to_student() {
        assert_eq!(Role::parse_or_default("Teacher"), Role::Teacher);
        assert_eq!(Role::parse_or_default(" admin "), Role::Admin);
        assert_eq!(Role::parse_or_default("principal"), Role::Student);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_every_role_has_a_dashboard() {
        for role in Role::ALL {
            let profile = role.profile();
            assert_eq!(profile.home(), format!("/{}", role));
            assert!(!profile.widgets.is_empty());
        }
    }

    #[test]
    fn test_only_students_take_quizzes() {
        let takers: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| role.profile().can_take_quizzes())
            .collect();
        assert_eq!(takers, vec![Role::Student]);
    }
}
