// Argument validation helpers with consistent error messages

use crate::error::Error;
use crate::models::Project;
use crate::utils::fuzzy;

/// Parse a positive numeric id
pub fn validate_id(id_str: &str, entity: &str) -> Result<i64, Error> {
    let id = id_str.trim().parse::<i64>().map_err(|_| {
        Error::validation(format!("Invalid {} ID: '{}'. {} ID must be a number.", entity.to_lowercase(), id_str, entity))
    })?;
    if id > 0 {
        Ok(id)
    } else {
        Err(Error::validation(format!("Invalid {} ID: {}. {} ID must be positive.", entity.to_lowercase(), id, entity)))
    }
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("{} cannot be empty", field_name)))
    } else {
        Ok(())
    }
}

/// Find a project by id or exact name among the visible `candidates`
///
/// Projects outside `candidates` (another owner's) are never matched. On a
/// miss the error suggests near matches.
pub fn resolve_project(reference: &str, candidates: &[Project]) -> Result<Project, Error> {
    validate_non_empty(reference, "Project")?;
    let reference = reference.trim();

    let by_id = reference
        .parse::<i64>()
        .ok()
        .and_then(|id| candidates.iter().find(|p| p.id == Some(id)));
    if let Some(project) = by_id.or_else(|| candidates.iter().find(|p| p.name == reference)) {
        return Ok(project.clone());
    }

    let names: Vec<&str> = candidates.iter().map(|p| p.name.as_str()).collect();
    Err(not_found_with_suggestions("Project", reference, &names))
}

/// "<Entity> 'x' not found", plus "Did you mean ...?" when something is close
pub fn not_found_with_suggestions(entity: &str, reference: &str, candidates: &[&str]) -> Error {
    let matches = fuzzy::find_near_matches(reference, candidates, 3);
    if matches.is_empty() {
        Error::validation(format!("{} '{}' not found", entity, reference))
    } else {
        let quoted: Vec<String> = matches.iter().map(|name| format!("'{}'", name)).collect();
        Error::validation(format!(
            "{} '{}' not found. Did you mean {}?",
            entity,
            reference,
            quoted.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::forms::ProjectDraft;
    use crate::repo::{ProjectRepo, UserRepo};

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("1", "Task").unwrap(), 1);
        assert_eq!(validate_id(" 42 ", "Task").unwrap(), 42);
        assert!(validate_id("0", "Task").is_err());
        assert!(validate_id("-1", "Task").is_err());
        let err = validate_id("abc", "Task").unwrap_err();
        assert_eq!(err.to_string(), "Invalid task ID: 'abc'. Task ID must be a number.");
    }

    #[test]
    fn test_suggestions() {
        let err = not_found_with_suggestions("Project", "Alhpa", &["Alpha", "Beta"]);
        assert_eq!(err.to_string(), "Project 'Alhpa' not found. Did you mean 'Alpha'?");

        let err = not_found_with_suggestions("Project", "Zeta Omega", &["Alpha"]);
        assert_eq!(err.to_string(), "Project 'Zeta Omega' not found");
    }

    #[test]
    fn test_resolve_project() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let draft = ProjectDraft { name: "Alpha".to_string(), ..Default::default() };
        let alpha = ProjectRepo::create(&conn, &draft, None).unwrap();
        let all = ProjectRepo::list(&conn, None).unwrap();

        let by_id = resolve_project(&alpha.id.unwrap().to_string(), &all).unwrap();
        assert_eq!(by_id.name, "Alpha");
        let by_name = resolve_project(" Alpha ", &all).unwrap();
        assert_eq!(by_name.id, alpha.id);

        let err = resolve_project("alpah", &all).unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("Did you mean 'Alpha'?"));
    }

    #[test]
    fn test_resolve_project_ignores_other_owners() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let ana = UserRepo::create(&conn, "ana@example.com", "ana", None).unwrap().id;
        let bob = UserRepo::create(&conn, "bob@example.com", "bob", None).unwrap().id;
        let draft = |name: &str| ProjectDraft { name: name.to_string(), ..Default::default() };
        ProjectRepo::create(&conn, &draft("Mine"), ana).unwrap();
        let theirs = ProjectRepo::create(&conn, &draft("Theirs"), bob).unwrap();

        let visible = ProjectRepo::list(&conn, ana).unwrap();
        assert!(resolve_project("Mine", &visible).is_ok());
        assert!(resolve_project("Theirs", &visible).is_err());
        let err = resolve_project(&theirs.id.unwrap().to_string(), &visible).unwrap_err();
        assert_eq!(err.to_string(), format!("Project '{}' not found", theirs.id.unwrap()));
    }
}
