//! Template executor: renders route configuration and supports hot swapping
//! the VirtualServer and TransportServer templates.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::templates::compiled::{CompiledTemplate, TemplateResult, TemplateSlot};
use crate::templates::model::{PassthroughHosts, TransportServerConfig, VirtualServerConfig};

const PASSTHROUGH_HOSTS_TEMPLATE: &str = "# mapping between TLS Passthrough hosts and unix sockets
{{#each this}}
{{@key}} {{this}};
{{/each}}
";

/// Executes NGINX configuration templates.
///
/// Active templates sit behind `ArcSwap`, so a swap is published as one
/// pointer store and renders racing with it see either the old or the new
/// template, never a mix. The originals are compiled once and never replaced.
#[derive(Debug)]
pub struct TemplateExecutor {
    original_virtual_server: Arc<CompiledTemplate>,
    original_transport_server: Arc<CompiledTemplate>,
    virtual_server: ArcSwap<CompiledTemplate>,
    transport_server: ArcSwap<CompiledTemplate>,
    passthrough_hosts: CompiledTemplate,
}

impl TemplateExecutor {
    /// Compile the route templates found at the given paths.
    ///
    /// Any read or compile failure is returned before an executor exists.
    pub fn new(virtual_server_path: &Path, transport_server_path: &Path) -> TemplateResult<Self> {
        let virtual_server = Arc::new(CompiledTemplate::from_file(
            TemplateSlot::VirtualServerRoute,
            virtual_server_path,
        )?);
        let transport_server = Arc::new(CompiledTemplate::from_file(
            TemplateSlot::TransportServerRoute,
            transport_server_path,
        )?);
        let passthrough_hosts =
            CompiledTemplate::compile(TemplateSlot::PassthroughHostMap, PASSTHROUGH_HOSTS_TEMPLATE)?;

        tracing::info!(
            virtual_server = %virtual_server_path.display(),
            transport_server = %transport_server_path.display(),
            "Template executor initialized"
        );

        Ok(Self {
            virtual_server: ArcSwap::new(virtual_server.clone()),
            transport_server: ArcSwap::new(transport_server.clone()),
            original_virtual_server: virtual_server,
            original_transport_server: transport_server,
            passthrough_hosts,
        })
    }

    /// Replace the active VirtualServer template.
    ///
    /// On a compile error the active template is left as it was.
    pub fn update_virtual_server_template(&self, template: &str) -> TemplateResult<()> {
        let compiled = CompiledTemplate::compile(TemplateSlot::VirtualServerRoute, template)?;
        self.virtual_server.store(Arc::new(compiled));
        tracing::info!("Custom VirtualServer template applied");
        Ok(())
    }

    /// Replace the active TransportServer template.
    ///
    /// On a compile error the active template is left as it was.
    pub fn update_transport_server_template(&self, template: &str) -> TemplateResult<()> {
        let compiled = CompiledTemplate::compile(TemplateSlot::TransportServerRoute, template)?;
        self.transport_server.store(Arc::new(compiled));
        tracing::info!("Custom TransportServer template applied");
        Ok(())
    }

    /// Go back to the VirtualServer template loaded at startup.
    pub fn use_original_virtual_server_template(&self) {
        self.virtual_server.store(self.original_virtual_server.clone());
        tracing::info!("Reverted to original VirtualServer template");
    }

    /// Go back to the TransportServer template loaded at startup.
    pub fn use_original_transport_server_template(&self) {
        self.transport_server.store(self.original_transport_server.clone());
        tracing::info!("Reverted to original TransportServer template");
    }

    /// Render the configuration file for a VirtualServer resource.
    pub fn execute_virtual_server_template(&self, cfg: &VirtualServerConfig) -> TemplateResult<Vec<u8>> {
        self.virtual_server.load().render(cfg)
    }

    /// Render the configuration file for a TransportServer resource.
    pub fn execute_transport_server_template(
        &self,
        cfg: &TransportServerConfig,
    ) -> TemplateResult<Vec<u8>> {
        self.transport_server.load().render(cfg)
    }

    /// Render the map between TLS passthrough hosts and their unix sockets.
    pub fn execute_passthrough_hosts_template(&self, hosts: &PassthroughHosts) -> TemplateResult<Vec<u8>> {
        self.passthrough_hosts.render(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    use crate::templates::compiled::TemplateError;
    use crate::templates::model::Server;

    fn executor(dir: &TempDir) -> TemplateExecutor {
        let vs = dir.path().join("virtualserver.tmpl");
        let ts = dir.path().join("transportserver.tmpl");
        fs::write(&vs, "server { server_name {{server.server_name}}; }").unwrap();
        fs::write(&ts, "server { listen {{server.listen}}; }").unwrap();
        TemplateExecutor::new(&vs, &ts).unwrap()
    }

    fn vs_config(name: &str) -> VirtualServerConfig {
        VirtualServerConfig {
            server: Server {
                server_name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_fails_on_invalid_file_template() {
        let dir = TempDir::new().unwrap();
        let vs = dir.path().join("virtualserver.tmpl");
        let ts = dir.path().join("transportserver.tmpl");
        fs::write(&vs, "server { server_name {{server.server_name; }").unwrap();
        fs::write(&ts, "server {}").unwrap();

        let err = TemplateExecutor::new(&vs, &ts).unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));
    }

    #[test]
    fn test_new_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let vs = dir.path().join("virtualserver.tmpl");
        fs::write(&vs, "server {}").unwrap();

        let err = TemplateExecutor::new(&vs, &dir.path().join("absent.tmpl")).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }

    #[test]
    fn test_swap_and_rollback_virtual_server() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);
        let cfg = vs_config("cafe.example.com");

        let original = executor.execute_virtual_server_template(&cfg).unwrap();
        assert_eq!(original, b"server { server_name cafe.example.com; }");

        for i in 0..3 {
            let custom = format!("custom-{} {{{{server.server_name}}}}", i);
            executor.update_virtual_server_template(&custom).unwrap();
            let out = executor.execute_virtual_server_template(&cfg).unwrap();
            assert_eq!(out, format!("custom-{} cafe.example.com", i).into_bytes());
        }

        executor.use_original_virtual_server_template();
        assert_eq!(executor.execute_virtual_server_template(&cfg).unwrap(), original);
    }

    #[test]
    fn test_rejected_swap_keeps_active_transport_server() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);
        let mut cfg = TransportServerConfig::default();
        cfg.server.listen = "unix:/var/lib/nginx/passthrough-https.sock".to_string();

        executor
            .update_transport_server_template("custom {{server.listen}}")
            .unwrap();
        let before = executor.execute_transport_server_template(&cfg).unwrap();

        let err = executor
            .update_transport_server_template("listen {{server.listen;")
            .unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));

        let after = executor.execute_transport_server_template(&cfg).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_render_error_leaves_other_slots_usable() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);

        executor
            .update_virtual_server_template("{{server.no_such_field}}")
            .unwrap();
        let err = executor
            .execute_virtual_server_template(&vs_config("a"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));

        let ts = executor
            .execute_transport_server_template(&TransportServerConfig::default())
            .unwrap();
        assert_eq!(ts, b"server { listen ; }");
    }

    #[test]
    fn test_passthrough_hosts_one_line_per_entry() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);

        let mut hosts = PassthroughHosts::new();
        hosts.insert("app.example.com".into(), "unix:/var/lib/nginx/passthrough-app.sock".into());
        hosts.insert("db.example.com".into(), "unix:/var/lib/nginx/passthrough-db.sock".into());
        hosts.insert("api.example.com".into(), "unix:/var/lib/nginx/passthrough-api.sock".into());

        for _ in 0..2 {
            let out = String::from_utf8(executor.execute_passthrough_hosts_template(&hosts).unwrap()).unwrap();
            let lines: Vec<&str> = out
                .lines()
                .map(str::trim)
                .filter(|l| l.ends_with(';'))
                .collect();
            assert_eq!(lines.len(), hosts.len());

            let unique: HashSet<&str> = lines.iter().copied().collect();
            for (host, socket) in &hosts {
                assert!(unique.contains(format!("{} {};", host, socket).as_str()));
            }
        }
    }

    #[test]
    fn test_passthrough_hosts_sorted_by_host() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);

        let mut hosts = PassthroughHosts::new();
        hosts.insert("b.example.com".into(), "unix:/b.sock".into());
        hosts.insert("a.example.com".into(), "unix:/a.sock".into());

        let out = String::from_utf8(executor.execute_passthrough_hosts_template(&hosts).unwrap()).unwrap();
        let a = out.find("a.example.com").unwrap();
        let b = out.find("b.example.com").unwrap();
        assert!(a < b);
        assert!(out.starts_with("# mapping between TLS Passthrough hosts and unix sockets"));
    }

    #[test]
    fn test_empty_passthrough_map_renders_header_only() {
        let dir = TempDir::new().unwrap();
        let executor = executor(&dir);

        let out = String::from_utf8(
            executor
                .execute_passthrough_hosts_template(&PassthroughHosts::new())
                .unwrap(),
        )
        .unwrap();
        assert!(!out.contains(';'));
    }
}
