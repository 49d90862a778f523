//! XML 分类服务 - 业务能力层
//!
//! 只负责"判断一份 XML 是取消事件还是已授权 CT-e，并抽取字段"，不关心压缩包和企业

use crate::error::DocumentError;
use crate::models::CteFields;
use roxmltree::{Document, Node};

/// 单份 XML 的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 取消事件；引用的 CT-e 键可能缺失
    Cancellation { chave: Option<String> },
    /// 候选的已授权 CT-e
    Authorized(CteFields),
}

/// XML 分类服务
///
/// 职责：
/// - 按根元素的命名空间查找字段
/// - 区分取消事件与已授权 CT-e
/// - 字段缺失时返回 None，不报错
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 分类一份 XML
    ///
    /// # 参数
    /// - `entry`: 条目名（仅用于错误信息）
    /// - `bytes`: XML 原始内容
    pub fn classify(&self, entry: &str, bytes: &[u8]) -> Result<Classification, DocumentError> {
        let text = std::str::from_utf8(bytes).map_err(|source| DocumentError::InvalidUtf8 {
            entry: entry.to_string(),
            source,
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let doc = Document::parse(text).map_err(|source| DocumentError::XmlParseFailed {
            entry: entry.to_string(),
            source,
        })?;

        let lookup = NsLookup::for_root(doc.root_element());

        if let Some(desc) = lookup.find(&["descEvento"]) {
            if text_of(desc).to_lowercase().contains("cancelamento") {
                let chave = lookup
                    .find(&["chCTe"])
                    .map(|n| text_of(n).trim().to_string())
                    .filter(|k| !k.is_empty());
                return Ok(Classification::Cancellation { chave });
            }
        }

        Ok(Classification::Authorized(lookup.cte_fields()))
    }
}

/// 限定在根命名空间内的元素查找（相当于 `.//ns:a/ns:b`）
struct NsLookup<'a, 'input> {
    root: Node<'a, 'input>,
    ns: String,
}

impl<'a, 'input> NsLookup<'a, 'input> {
    /// 命名空间取根标签 `{ns}tag` 中 `}` 之前的部分；
    /// 根元素没有命名空间时退化为根的本地名，此时所有限定查找都找不到
    fn for_root(root: Node<'a, 'input>) -> Self {
        let ns = root
            .tag_name()
            .namespace()
            .unwrap_or_else(|| root.tag_name().name())
            .to_string();
        Self { root, ns }
    }

    fn is(&self, node: &Node<'_, '_>, local: &str) -> bool {
        node.is_element()
            && node.tag_name().name() == local
            && node.tag_name().namespace() == Some(self.ns.as_str())
    }

    fn child(&self, node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
        node.children().find(|c| self.is(c, local))
    }

    /// 第一个匹配路径的后代元素（不含根自身）
    fn find(&self, path: &[&str]) -> Option<Node<'a, 'input>> {
        let (first, rest) = path.split_first()?;
        self.root
            .descendants()
            .skip(1)
            .filter(|n| self.is(n, first))
            .find_map(|start| {
                rest.iter()
                    .try_fold(start, |node, step| self.child(node, step))
            })
    }

    fn find_text(&self, path: &[&str]) -> Option<String> {
        self.find(path).map(|n| text_of(n).to_string())
    }

    fn cte_fields(&self) -> CteFields {
        let ide = self.find(&["ide"]);
        let ide_text = |local: &str| {
            ide.and_then(|node| self.child(node, local))
                .map(|n| text_of(n).to_string())
        };

        CteFields {
            numero: ide_text("nCT"),
            serie: ide_text("serie"),
            chave: self
                .find(&["infCte"])
                .map(|n| n.attribute("Id").unwrap_or_default().replace("CTe", "")),
            data_emissao: ide_text("dhEmi"),
            status: self.find_text(&["protCTe", "infProt", "xMotivo"]),
            valor: self.find_text(&["vPrest", "vRec"]),
            emitente: self.find_text(&["emit", "xNome"]),
            destinatario: self.find_text(&["dest", "xNome"]),
        }
    }
}

fn text_of<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{authorized_cte_xml, cancellation_event_xml};

    fn classify(xml: &str) -> Classification {
        DocumentClassifier::new()
            .classify("test.xml", xml.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_authorized_cte_fields_are_extracted() {
        let xml = authorized_cte_xml("35200714200166000187550010000000046550000046", "10", "1");

        let Classification::Authorized(fields) = classify(&xml) else {
            panic!("expected authorized document");
        };

        assert_eq!(
            fields.chave.as_deref(),
            Some("35200714200166000187550010000000046550000046")
        );
        assert_eq!(fields.numero.as_deref(), Some("10"));
        assert_eq!(fields.serie.as_deref(), Some("1"));
        assert_eq!(fields.data_emissao.as_deref(), Some("2026-01-12T08:30:00-03:00"));
        assert_eq!(fields.valor.as_deref(), Some("1500.00"));
        assert_eq!(fields.emitente.as_deref(), Some("Transportes Acme Ltda"));
        assert_eq!(fields.destinatario.as_deref(), Some("Mercado Central SA"));
        assert_eq!(fields.status.as_deref(), Some("Autorizado o uso do CT-e"));
    }

    #[test]
    fn test_cancellation_event_yields_key_only() {
        let xml = cancellation_event_xml("35200714200166000187550010000000046550000046");

        assert_eq!(
            classify(&xml),
            Classification::Cancellation {
                chave: Some("35200714200166000187550010000000046550000046".to_string())
            }
        );
    }

    #[test]
    fn test_cancellation_marker_is_case_insensitive() {
        let xml = cancellation_event_xml("123").replace("Cancelamento", "CANCELAMENTO");
        assert!(matches!(classify(&xml), Classification::Cancellation { .. }));
    }

    #[test]
    fn test_cancellation_without_key_yields_nothing() {
        let xml = cancellation_event_xml("");
        assert_eq!(classify(&xml), Classification::Cancellation { chave: None });
    }

    #[test]
    fn test_other_event_is_treated_as_candidate() {
        let xml = cancellation_event_xml("123").replace("Cancelamento", "Carta de Correcao");

        let Classification::Authorized(fields) = classify(&xml) else {
            panic!("non-cancellation events are not cancellations");
        };
        assert_eq!(fields.chave, None);
        assert_eq!(fields.numero, None);
    }

    #[test]
    fn test_missing_subtrees_are_none() {
        let xml = r#"<cteProc xmlns="http://www.portalfiscal.inf.br/cte"><CTe><infCte Id="CTe999"/></CTe></cteProc>"#;

        let Classification::Authorized(fields) = classify(xml) else {
            panic!("expected authorized document");
        };
        assert_eq!(fields.chave.as_deref(), Some("999"));
        assert_eq!(fields.numero, None);
        assert_eq!(fields.status, None);
        assert_eq!(fields.emitente, None);
    }

    #[test]
    fn test_infcte_without_id_gives_empty_key() {
        let xml = r#"<cteProc xmlns="http://www.portalfiscal.inf.br/cte"><CTe><infCte/></CTe></cteProc>"#;

        let Classification::Authorized(fields) = classify(xml) else {
            panic!("expected authorized document");
        };
        assert_eq!(fields.chave.as_deref(), Some(""));
    }

    #[test]
    fn test_root_without_namespace_matches_nothing() {
        let xml = r#"<cteProc><CTe><infCte Id="CTe999"><ide><nCT>1</nCT></ide></infCte></CTe></cteProc>"#;

        assert_eq!(classify(xml), Classification::Authorized(CteFields::default()));
    }

    #[test]
    fn test_byte_order_mark_is_accepted() {
        let xml = format!("\u{feff}{}", authorized_cte_xml("1", "1", "1"));
        assert!(matches!(classify(&xml), Classification::Authorized(_)));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = DocumentClassifier::new()
            .classify("quebrado.xml", b"<cteProc><ide>")
            .unwrap_err();

        assert!(matches!(err, DocumentError::XmlParseFailed { .. }));
        assert!(err.to_string().contains("quebrado.xml"));
    }
}
