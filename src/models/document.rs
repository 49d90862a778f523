/// 没有协议状态时的默认状态
pub const STATUS_AUTORIZADO: &str = "Autorizado";
/// 对账后被取消事件命中的状态
pub const STATUS_CANCELADO: &str = "Cancelado";

/// 汇总表的列名（顺序即输出顺序）
pub const SUMMARY_HEADERS: [&str; 10] = [
    "Empresa",
    "CNPJ",
    "Número",
    "Série",
    "Chave",
    "Data de Emissão",
    "Status",
    "Valor",
    "Emitente",
    "Destinatário",
];

/// 从 CT-e XML 中抽取的字段，每一项都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CteFields {
    pub numero: Option<String>,
    pub serie: Option<String>,
    pub chave: Option<String>,
    pub data_emissao: Option<String>,
    pub status: Option<String>,
    pub valor: Option<String>,
    pub emitente: Option<String>,
    pub destinatario: Option<String>,
}

/// 一条已授权（或对账后已取消）的 CT-e 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub empresa: String,
    pub cnpj: String,
    pub numero: String,
    pub serie: String,
    pub chave: String,
    pub data_emissao: String,
    pub status: String,
    pub valor: String,
    pub emitente: String,
    pub destinatario: String,
}

impl DocumentRecord {
    /// 用抽取结果构建记录，缺失字段在这里统一补默认值
    pub fn from_fields(empresa: &str, cnpj: &str, fields: CteFields) -> Self {
        Self {
            empresa: empresa.to_string(),
            cnpj: cnpj.to_string(),
            numero: fields.numero.unwrap_or_default(),
            serie: fields.serie.unwrap_or_default(),
            chave: fields.chave.unwrap_or_default(),
            data_emissao: fields
                .data_emissao
                .map(|d| d.chars().take(10).collect())
                .unwrap_or_default(),
            status: fields
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STATUS_AUTORIZADO.to_string()),
            valor: fields.valor.unwrap_or_default(),
            emitente: fields.emitente.unwrap_or_default(),
            destinatario: fields.destinatario.unwrap_or_default(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELADO
    }

    /// 按 SUMMARY_HEADERS 的顺序返回各列
    pub fn summary_row(&self) -> [&str; 10] {
        [
            &self.empresa,
            &self.cnpj,
            &self.numero,
            &self.serie,
            &self.chave,
            &self.data_emissao,
            &self.status,
            &self.valor,
            &self.emitente,
            &self.destinatario,
        ]
    }
}
