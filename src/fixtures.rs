//! 单元测试共用的 XML / ZIP 样本

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// 带授权协议的 cteProc，Id 为 `CTe{chave}`
pub fn authorized_cte_xml(chave: &str, numero: &str, serie: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cteProc xmlns="http://www.portalfiscal.inf.br/cte" versao="4.00">
  <CTe>
    <infCte Id="CTe{chave}" versao="4.00">
      <ide>
        <cUF>35</cUF>
        <serie>{serie}</serie>
        <nCT>{numero}</nCT>
        <dhEmi>2026-01-12T08:30:00-03:00</dhEmi>
      </ide>
      <emit>
        <CNPJ>14200166000187</CNPJ>
        <xNome>Transportes Acme Ltda</xNome>
      </emit>
      <dest>
        <CNPJ>00000000000191</CNPJ>
        <xNome>Mercado Central SA</xNome>
      </dest>
      <vPrest>
        <vTPrest>1500.00</vTPrest>
        <vRec>1500.00</vRec>
      </vPrest>
    </infCte>
  </CTe>
  <protCTe versao="4.00">
    <infProt>
      <chCTe>{chave}</chCTe>
      <cStat>100</cStat>
      <xMotivo>Autorizado o uso do CT-e</xMotivo>
    </infProt>
  </protCTe>
</cteProc>"#
    )
}

/// 取消事件 procEventoCTe，引用 `chave`
pub fn cancellation_event_xml(chave: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<procEventoCTe xmlns="http://www.portalfiscal.inf.br/cte" versao="4.00">
  <eventoCTe versao="4.00">
    <infEvento Id="ID110111{chave}01">
      <cOrgao>35</cOrgao>
      <chCTe>{chave}</chCTe>
      <tpEvento>110111</tpEvento>
      <detEvento versaoEvento="4.00">
        <evCancCTe>
          <descEvento>Cancelamento</descEvento>
          <nProt>135260000000001</nProt>
          <xJust>Erro na emissao do documento</xJust>
        </evCancCTe>
      </detEvento>
    </infEvento>
  </eventoCTe>
</procEventoCTe>"#
    )
}

/// 把若干 (文件名, 内容) 打成内存中的 ZIP
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
