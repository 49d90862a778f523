use std::fmt;

/// 门户提供的两种批量压缩包
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Cte,
    Mdfe,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Cte, DocumentKind::Mdfe];

    /// 批量下载接口路径
    pub fn download_path(&self) -> &'static str {
        match self {
            DocumentKind::Cte => "/ConsultaCTe/DownloadLoteXML",
            DocumentKind::Mdfe => "/ConsultaMDFe/DownloadLoteXML",
        }
    }

    /// 下载文件名，如 CTe_123.zip
    ///
    /// CNPJ 常写成 `11.222.333/0001-81`，文件名中不允许的字符替换为 `_`
    pub fn file_name(&self, cnpj: &str) -> String {
        let cnpj = file_safe(cnpj);
        match self {
            DocumentKind::Cte => format!("CTe_{}.zip", cnpj),
            DocumentKind::Mdfe => format!("MDFe_{}.zip", cnpj),
        }
    }
}

fn file_safe(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Cte => f.write_str("CT-e"),
            DocumentKind::Mdfe => f.write_str("MDF-e"),
        }
    }
}
