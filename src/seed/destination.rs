//! Where a project's bare repository lives on the instance.

/// Bare repositories on instances that serve model files from shared storage.
pub const SHARED_BARE_MODELS: &str = "/mnt/lookerfiles/bare_models";

/// Bare repositories on instances with local model storage.
pub const LOCAL_BARE_MODELS: &str = "/home/looker/looker/bare_models";

/// Path of the bare repository backing `project_id`.
pub fn bare_repo_path(shared_storage: bool, project_id: &str) -> String {
    let root = if shared_storage {
        SHARED_BARE_MODELS
    } else {
        LOCAL_BARE_MODELS
    };
    format!("{}/{}.git", root, project_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_storage_destination() {
        assert_eq!(
            bare_repo_path(true, "proj42"),
            "/mnt/lookerfiles/bare_models/proj42.git"
        );
    }

    #[test]
    fn local_storage_destination() {
        assert_eq!(
            bare_repo_path(false, "proj42"),
            "/home/looker/looker/bare_models/proj42.git"
        );
    }
}
