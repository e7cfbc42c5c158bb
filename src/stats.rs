//! Dashboard summary numbers

use serde::Serialize;

use crate::models::{Project, ProjectStatus, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
}

/// Aggregates shown on the dashboard summary cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub completed_projects: usize,
    pub ongoing_projects: usize,
    /// Mean completion percentage, 0.0 with no projects
    pub avg_completion: f64,
    /// Projects at High or Critical priority
    pub high_priority: usize,
    /// Every project status in lifecycle order, zeros included
    pub status_counts: Vec<StatusCount>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Rounded percentage of completed tasks
    pub task_completion: u8,
    pub overdue_tasks: usize,
    pub services: usize,
}

impl DashboardStats {
    pub fn compute(projects: &[Project], tasks: &[Task], services: usize, now_ts: i64) -> Self {
        let total_projects = projects.len();
        let completed_projects = projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Completed)
            .count();

        let avg_completion = if total_projects == 0 {
            0.0
        } else {
            let sum: u64 = projects.iter().map(|p| p.completion as u64).sum();
            sum as f64 / total_projects as f64
        };

        let status_counts = ProjectStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status: status.as_str(),
                count: projects.iter().filter(|p| p.status == status).count(),
            })
            .collect();

        let total_tasks = tasks.len();
        let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
        let task_completion = if total_tasks == 0 {
            0
        } else {
            ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as u8
        };

        Self {
            total_projects,
            completed_projects,
            ongoing_projects: total_projects - completed_projects,
            avg_completion,
            high_priority: projects.iter().filter(|p| p.priority.is_high()).count(),
            status_counts,
            total_tasks,
            completed_tasks,
            task_completion,
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(now_ts)).count(),
            services,
        }
    }

    pub fn count_for(&self, status: ProjectStatus) -> usize {
        self.status_counts
            .iter()
            .find(|c| c.status == status.as_str())
            .map_or(0, |c| c.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectPriority;

    #[test]
    fn test_empty_dashboard() {
        let stats = DashboardStats::compute(&[], &[], 0, 0);
        assert_eq!(stats.total_projects, 0);
        assert_eq!(stats.avg_completion, 0.0);
        assert_eq!(stats.task_completion, 0);
        assert_eq!(stats.status_counts.len(), ProjectStatus::ALL.len());
        assert!(stats.status_counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_project_numbers() {
        let mut a = Project::new("a");
        a.completion = 100;
        a.status = ProjectStatus::Completed;
        a.priority = ProjectPriority::Critical;
        let mut b = Project::new("b");
        b.completion = 50;
        b.priority = ProjectPriority::High;
        let mut c = Project::new("c");
        c.completion = 0;
        c.priority = ProjectPriority::Low;

        let stats = DashboardStats::compute(&[a, b, c], &[], 2, 0);
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.ongoing_projects, 2);
        assert_eq!(stats.avg_completion, 50.0);
        assert_eq!(stats.high_priority, 2);
        assert_eq!(stats.count_for(ProjectStatus::Planning), 2);
        assert_eq!(stats.count_for(ProjectStatus::Completed), 1);
        assert_eq!(stats.count_for(ProjectStatus::OnHold), 0);
        assert_eq!(stats.services, 2);
    }

    #[test]
    fn test_task_numbers() {
        let mut done = Task::new(1, "done");
        done.status = TaskStatus::Completed;
        done.due_ts = Some(10);
        let mut late = Task::new(1, "late");
        late.due_ts = Some(10);
        let open = Task::new(1, "open");

        let stats = DashboardStats::compute(&[], &[done, late, open], 0, 100);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.task_completion, 33);
        assert_eq!(stats.overdue_tasks, 1);
    }
}
