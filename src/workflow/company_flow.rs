//! 企业处理流程 - 流程层
//!
//! 核心职责：定义"一家企业"的完整处理流程
//!
//! 流程顺序：
//! 1. 打开登录页（失败 → Erro acesso）
//! 2. 提交账号密码，检查认证 Cookie（缺失 → Login falhou）
//! 3. 下载 CT-e 压缩包并解析 XML
//! 4. 下载 MDF-e 压缩包
//! 5. 记录 ✅ Download OK（下载失败只记为空压缩包）

use tracing::{error, info, warn};

use crate::infrastructure::{PortalConnector, PortalSession};
use crate::models::{CompanyCredential, DateRange, DocumentKind, OperationResult, OperationStatus};
use crate::orchestrator::RunContext;
use crate::services::BatchExtractor;
use crate::workflow::company_ctx::CompanyCtx;

/// 企业处理流程
///
/// - 每家企业打开一个全新的会话，流程结束即丢弃
/// - 把结果写入调用方持有的 RunContext
/// - 任何失败都只影响当前企业
pub struct CompanyFlow<'a, C: PortalConnector> {
    connector: &'a C,
    extractor: BatchExtractor,
    range: DateRange,
}

impl<'a, C: PortalConnector> CompanyFlow<'a, C> {
    pub fn new(connector: &'a C, range: DateRange) -> Self {
        Self {
            connector,
            extractor: BatchExtractor::new(),
            range,
        }
    }

    /// 处理一家企业，并把最终状态追加到操作结果表
    pub async fn run(
        &self,
        ctx: &CompanyCtx,
        credential: &CompanyCredential,
        state: &mut RunContext,
    ) -> OperationStatus {
        let status = self.execute(ctx, credential, state).await;
        state.record_result(OperationResult::new(credential, status));
        status
    }

    async fn execute(
        &self,
        ctx: &CompanyCtx,
        credential: &CompanyCredential,
        state: &mut RunContext,
    ) -> OperationStatus {
        let session = match self.connector.open_session() {
            Ok(session) => session,
            Err(e) => {
                error!("{} ❌ 无法创建会话: {}", ctx, e);
                return OperationStatus::AccessError;
            }
        };

        // ========== 步骤 1: 登录页 ==========
        match session.fetch_login_page().await {
            Ok(true) => {}
            Ok(false) => {
                warn!("{} ⚠️ 登录页返回非成功状态", ctx);
                return OperationStatus::AccessError;
            }
            Err(e) => {
                warn!("{} ⚠️ 登录页无法访问: {}", ctx, e);
                return OperationStatus::AccessError;
            }
        }

        // ========== 步骤 2: 登录 ==========
        if let Err(e) = session
            .submit_credentials(&credential.usuario, &credential.senha)
            .await
        {
            warn!("{} ⚠️ 登录请求失败: {}", ctx, e);
        }

        if !session.is_authenticated() {
            warn!("{} ⚠️ 登录失败：没有认证 Cookie", ctx);
            return OperationStatus::LoginFailed;
        }
        info!("{} ✅ 登录成功", ctx);

        // ========== 步骤 3: CT-e ==========
        let cte = self.download(&session, DocumentKind::Cte, ctx).await;
        if let Some(bytes) = &cte {
            self.ingest(bytes, ctx, state);
        }
        state.store_archive(DocumentKind::Cte, &credential.cnpj, cte);

        // ========== 步骤 4: MDF-e ==========
        let mdfe = self.download(&session, DocumentKind::Mdfe, ctx).await;
        state.store_archive(DocumentKind::Mdfe, &credential.cnpj, mdfe);

        OperationStatus::DownloadOk
    }

    /// 下载压缩包；请求失败也只记为空
    async fn download(
        &self,
        session: &C::Session,
        kind: DocumentKind,
        ctx: &CompanyCtx,
    ) -> Option<Vec<u8>> {
        match session.download_batch(kind, &self.range).await {
            Ok(Some(bytes)) => {
                info!("{} 📥 {} 已下载 ({} 字节)", ctx, kind, bytes.len());
                Some(bytes)
            }
            Ok(None) => {
                warn!("{} ⚠️ {} 没有返回有效的 ZIP", ctx, kind);
                None
            }
            Err(e) => {
                warn!("{} ⚠️ {} 下载失败: {}", ctx, kind, e);
                None
            }
        }
    }

    /// 解析 CT-e 压缩包并合并到运行状态
    fn ingest(&self, bytes: &[u8], ctx: &CompanyCtx, state: &mut RunContext) {
        match self.extractor.extract(bytes, &ctx.empresa, &ctx.cnpj) {
            Ok(report) => {
                info!(
                    "{} 📄 XML {} 个：CT-e {} 条，取消事件 {} 个，失败 {} 个",
                    ctx,
                    report.xml_entries,
                    report.documents.len(),
                    report.cancellation_keys.len(),
                    report.failures.len()
                );
                state.absorb(report);
            }
            Err(e) => {
                warn!("{} ⚠️ CT-e 压缩包无法解析: {}", ctx, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult, PortalError};
    use crate::fixtures::{authorized_cte_xml, cancellation_event_xml, zip_of};
    use crate::models::STATUS_CANCELADO;
    use chrono::NaiveDate;
    use std::cell::Cell;

    const KEY: &str = "35260114200166000187570010000000010000000010";

    /// 按脚本应答的门户
    #[derive(Clone, Default)]
    struct ScriptedPortal {
        login_page_ok: bool,
        login_page_unreachable: bool,
        valid_password: String,
        cte: Option<Vec<u8>>,
        mdfe: Option<Vec<u8>>,
        mdfe_transport_error: bool,
    }

    struct ScriptedSession {
        portal: ScriptedPortal,
        authenticated: Cell<bool>,
    }

    impl PortalConnector for ScriptedPortal {
        type Session = ScriptedSession;

        fn open_session(&self) -> AppResult<ScriptedSession> {
            Ok(ScriptedSession {
                portal: self.clone(),
                authenticated: Cell::new(false),
            })
        }
    }

    impl PortalSession for ScriptedSession {
        async fn fetch_login_page(&self) -> AppResult<bool> {
            if self.portal.login_page_unreachable {
                return Err(AppError::Portal(PortalError::InvalidUrl {
                    url: "https://portal.invalid/Login".to_string(),
                    reason: "dns".to_string(),
                }));
            }
            Ok(self.portal.login_page_ok)
        }

        async fn submit_credentials(&self, _usuario: &str, senha: &str) -> AppResult<()> {
            self.authenticated.set(senha == self.portal.valid_password);
            Ok(())
        }

        fn is_authenticated(&self) -> bool {
            self.authenticated.get()
        }

        async fn download_batch(&self, kind: DocumentKind, _range: &DateRange) -> AppResult<Option<Vec<u8>>> {
            match kind {
                DocumentKind::Cte => Ok(self.portal.cte.clone()),
                DocumentKind::Mdfe if self.portal.mdfe_transport_error => {
                    Err(AppError::Portal(PortalError::InvalidUrl {
                        url: "https://portal.invalid/ConsultaMDFe".to_string(),
                        reason: "reset".to_string(),
                    }))
                }
                DocumentKind::Mdfe => Ok(self.portal.mdfe.clone()),
            }
        }
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn cte_with_cancellation() -> Vec<u8> {
        let cte = authorized_cte_xml(KEY, "10", "1");
        let cancel = cancellation_event_xml(KEY);
        zip_of(&[("cte.xml", cte.as_bytes()), ("cancelamento.xml", cancel.as_bytes())])
    }

    fn working_portal() -> ScriptedPortal {
        ScriptedPortal {
            login_page_ok: true,
            valid_password: "secret".to_string(),
            cte: Some(cte_with_cancellation()),
            mdfe: Some(zip_of(&[])),
            ..Default::default()
        }
    }

    async fn run_one(portal: &ScriptedPortal, credential: &CompanyCredential, state: &mut RunContext) -> OperationStatus {
        let flow = CompanyFlow::new(portal, january());
        let ctx = CompanyCtx::new(1, credential);
        flow.run(&ctx, credential, state).await
    }

    #[tokio::test]
    async fn test_rejected_credentials_record_login_failed() {
        let portal = working_portal();
        let credential = CompanyCredential::new("Acme", "123", "u", "bad");
        let mut state = RunContext::new();

        let status = run_one(&portal, &credential, &mut state).await;

        assert_eq!(status, OperationStatus::LoginFailed);
        assert_eq!(
            state.results(),
            &[OperationResult {
                empresa: "Acme".to_string(),
                cnpj: "123".to_string(),
                status: OperationStatus::LoginFailed,
            }]
        );
        assert!(!state.archives(DocumentKind::Cte).contains_key("123"));
        assert!(!state.archives(DocumentKind::Mdfe).contains_key("123"));
    }

    #[tokio::test]
    async fn test_unreachable_login_page_records_access_error() {
        let mut state = RunContext::new();
        let credential = CompanyCredential::new("Acme", "123", "u", "secret");

        let down = ScriptedPortal {
            login_page_ok: false,
            ..working_portal()
        };
        let unreachable = ScriptedPortal {
            login_page_unreachable: true,
            ..working_portal()
        };

        assert_eq!(run_one(&down, &credential, &mut state).await, OperationStatus::AccessError);
        assert_eq!(
            run_one(&unreachable, &credential, &mut state).await,
            OperationStatus::AccessError
        );
        assert_eq!(state.count_status(OperationStatus::AccessError), 2);
        assert!(state.archives(DocumentKind::Cte).is_empty());
    }

    #[tokio::test]
    async fn test_authorized_and_cancelled_in_same_archive() {
        let portal = working_portal();
        let credential = CompanyCredential::new("Acme", "123", "u", "secret");
        let mut state = RunContext::new();

        let status = run_one(&portal, &credential, &mut state).await;
        state.reconcile();

        assert_eq!(status, OperationStatus::DownloadOk);
        assert_eq!(state.documents().len(), 1);
        assert_eq!(state.documents()[0].numero, "10");
        assert_eq!(state.documents()[0].serie, "1");
        assert_eq!(state.documents()[0].status, STATUS_CANCELADO);
        assert!(state.archives(DocumentKind::Cte)["123"].is_some());
    }

    #[tokio::test]
    async fn test_failed_downloads_still_report_download_ok() {
        let portal = ScriptedPortal {
            cte: None,
            mdfe_transport_error: true,
            ..working_portal()
        };
        let credential = CompanyCredential::new("Acme", "123", "u", "secret");
        let mut state = RunContext::new();

        let status = run_one(&portal, &credential, &mut state).await;

        assert_eq!(status, OperationStatus::DownloadOk);
        assert_eq!(state.archives(DocumentKind::Cte).get("123"), Some(&None));
        assert_eq!(state.archives(DocumentKind::Mdfe).get("123"), Some(&None));
        assert!(state.documents().is_empty());
    }

    #[tokio::test]
    async fn test_non_zip_cte_payload_is_kept_but_not_parsed() {
        let portal = ScriptedPortal {
            cte: Some(b"<html>sessao expirada</html>".to_vec()),
            ..working_portal()
        };
        let credential = CompanyCredential::new("Acme", "123", "u", "secret");
        let mut state = RunContext::new();

        let status = run_one(&portal, &credential, &mut state).await;

        assert_eq!(status, OperationStatus::DownloadOk);
        assert!(state.documents().is_empty());
        assert!(state.archives(DocumentKind::Cte)["123"].is_some());
    }

    #[tokio::test]
    async fn test_duplicate_row_duplicates_records() {
        let portal = ScriptedPortal {
            cte: Some(zip_of(&[("cte.xml", authorized_cte_xml(KEY, "10", "1").as_bytes())])),
            ..working_portal()
        };
        let credential = CompanyCredential::new("Acme", "123", "u", "secret");
        let mut state = RunContext::new();

        run_one(&portal, &credential, &mut state).await;
        run_one(&portal, &credential, &mut state).await;
        let outcome = state.reconcile();

        assert_eq!(state.documents().len(), 2);
        assert_eq!(state.documents()[0], state.documents()[1]);
        assert_eq!(state.results().len(), 2);
        assert_eq!(state.archives(DocumentKind::Cte).len(), 1);
        assert_eq!(
            outcome,
            crate::orchestrator::ReconcileOutcome::Reconciled { documents: 2, cancelled: 0 }
        );
    }
}
