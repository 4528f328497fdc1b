//! TypeScript type generation module.
//!
//! Exports TypeScript definitions for every type annotated with
//! `#[ts(export)]`. Runs as a test so bindings are regenerated with the
//! test suite.

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use ts_rs::TS;

    #[test]
    fn generate_typescript_types() {
        // Output directory, in order of preference:
        // 1. SCHOOLFLOW_TS_OUTPUT_DIR
        // 2. ../../web/src/types/generated (if the web project is checked out)
        // 3. ../ts-bindings
        let output_dir_str = if let Ok(env_dir) = env::var("SCHOOLFLOW_TS_OUTPUT_DIR") {
            env_dir
        } else {
            let web_dir = "../../web/src/types/generated";
            if Path::new(web_dir).parent().unwrap_or(Path::new("")).exists() {
                web_dir.to_string()
            } else {
                "../ts-bindings".to_string()
            }
        };

        let output_dir = Path::new(&output_dir_str);
        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
        }

        // Remove stale .ts files so renamed or deleted types don't linger.
        for entry in std::fs::read_dir(output_dir).expect("Failed to read output directory") {
            let path = entry.expect("Failed to read directory entry").path();
            if path.extension().and_then(|s| s.to_str()) == Some("ts") {
                std::fs::remove_file(&path)
                    .unwrap_or_else(|e| panic!("Failed to remove {:?}: {}", path, e));
            }
        }

        unsafe {
            env::set_var("TS_RS_EXPORT_DIR", output_dir);
        }

        use crate::api::{
            ErrorResponse, SuccessResponse,
            account::AccountStatusResponse,
            login::LoginSuccessResponse,
            password::{ChangePasswordRequest, ChangePasswordResponse},
            register::{RegisterRequest, RegisterResponse},
            session::SessionCheckResponse,
            status::HealthStatus,
        };
        use crate::device::{DeviceInfo, DeviceType};
        use crate::models::*;
        use crate::orm::login::{LoginRequest, PasswordValidation};
        use crate::shell::ShellOutcome;

        Role::export().expect("Failed to export Role type");
        AccountStatus::export().expect("Failed to export AccountStatus type");
        SuperAdmin::export().expect("Failed to export SuperAdmin type");
        SchoolAdmin::export().expect("Failed to export SchoolAdmin type");
        Teacher::export().expect("Failed to export Teacher type");
        School::export().expect("Failed to export School type");
        SessionData::export().expect("Failed to export SessionData type");
        ActiveSession::export().expect("Failed to export ActiveSession type");
        DeviceType::export().expect("Failed to export DeviceType type");
        DeviceInfo::export().expect("Failed to export DeviceInfo type");

        ErrorResponse::export().expect("Failed to export ErrorResponse type");
        SuccessResponse::export().expect("Failed to export SuccessResponse type");
        LoginRequest::export().expect("Failed to export LoginRequest type");
        LoginSuccessResponse::export().expect("Failed to export LoginSuccessResponse type");
        SessionCheckResponse::export().expect("Failed to export SessionCheckResponse type");
        RegisterRequest::export().expect("Failed to export RegisterRequest type");
        RegisterResponse::export().expect("Failed to export RegisterResponse type");
        ChangePasswordRequest::export().expect("Failed to export ChangePasswordRequest type");
        ChangePasswordResponse::export().expect("Failed to export ChangePasswordResponse type");
        PasswordValidation::export().expect("Failed to export PasswordValidation type");
        AccountStatusResponse::export().expect("Failed to export AccountStatusResponse type");
        ShellOutcome::export().expect("Failed to export ShellOutcome type");
        HealthStatus::export().expect("Failed to export HealthStatus type");

        println!("TypeScript types generated successfully in {:?}", output_dir);
    }
}
