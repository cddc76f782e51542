//! Listing, record document and archive fixtures

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Namespace of the auth.036 delta report
pub const AUTH036_NS: &str = "urn:iso:std:iso:20022:tech:xsd:auth.036.001.02";

/// One `<doc>` of the solr listing
pub struct ListingDoc<'a> {
    pub file_type: &'a str,
    pub download_link: Option<&'a str>,
}

impl<'a> ListingDoc<'a> {
    pub fn new(file_type: &'a str, download_link: &'a str) -> Self {
        Self {
            file_type,
            download_link: Some(download_link),
        }
    }

    pub fn without_link(file_type: &'a str) -> Self {
        Self {
            file_type,
            download_link: None,
        }
    }
}

/// Build a solr-style listing response
pub fn listing_xml(docs: &[ListingDoc<'_>]) -> String {
    let mut body = String::new();
    for (i, doc) in docs.iter().enumerate() {
        body.push_str("    <doc>\n");
        body.push_str(&format!(
            "      <str name=\"checksum\">checksum{i}</str>\n      <str name=\"file_type\">{}</str>\n",
            doc.file_type
        ));
        if let Some(link) = doc.download_link {
            body.push_str(&format!("      <str name=\"download_link\">{link}</str>\n"));
        }
        body.push_str(&format!(
            "      <str name=\"file_name\">{}_{i}.zip</str>\n    </doc>\n",
            doc.file_type
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<response>\n  <lst name=\"responseHeader\">\n    <int name=\"status\">0</int>\n  </lst>\n  <result name=\"response\" numFound=\"{}\" start=\"0\">\n{body}  </result>\n</response>\n",
        docs.len()
    )
}

/// Field values of one terminated record; `None` omits the element
#[derive(Clone, Default)]
pub struct RecordFixture<'a> {
    pub id: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub classification_type: Option<&'a str>,
    pub commodity_derivative_indicator: Option<&'a str>,
    pub notional_currency: Option<&'a str>,
    pub issuer: Option<&'a str>,
}

impl<'a> RecordFixture<'a> {
    /// A record with every field set
    pub fn complete(id: &'a str, full_name: &'a str) -> Self {
        Self {
            id: Some(id),
            full_name: Some(full_name),
            classification_type: Some("DBFTFR"),
            commodity_derivative_indicator: Some("false"),
            notional_currency: Some("EUR"),
            issuer: Some("549300GDPG70E3MBBU98"),
        }
    }

    fn to_xml(&self) -> String {
        let element = |tag: &str, value: Option<&str>| {
            value
                .map(|v| format!("<{tag}>{v}</{tag}>"))
                .unwrap_or_default()
        };
        format!(
            "<TermntdRcrd><FinInstrmGnlAttrbts>{}{}{}{}{}</FinInstrmGnlAttrbts>{}<TradgVnRltdAttrbts><Id>XOFF</Id></TradgVnRltdAttrbts></TermntdRcrd>",
            element("Id", self.id),
            element("FullNm", self.full_name),
            element("ClssfctnTp", self.classification_type),
            element("CmmdtyDerivInd", self.commodity_derivative_indicator),
            element("NtnlCcy", self.notional_currency),
            element("Issr", self.issuer),
        )
    }
}

/// Build a BizData envelope holding the given terminated records
pub fn records_xml(records: &[RecordFixture<'_>]) -> String {
    let body: String = records.iter().map(RecordFixture::to_xml).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<BizData xmlns=\"urn:iso:std:iso:20022:tech:xsd:head.003.001.01\">\n<Hdr><AppHdr><Fr><OrgId><Id>EU</Id></OrgId></Fr></AppHdr></Hdr>\n<Pyld><Document xmlns=\"{AUTH036_NS}\"><FinInstrmRptgRefDataDltaRpt><RptHdr><RptgNtty><NtnlCmptntAuthrty>EU</NtnlCmptntAuthrty></RptgNtty></RptHdr>{body}</FinInstrmRptgRefDataDltaRpt></Document></Pyld>\n</BizData>\n"
    )
}

/// Build an in-memory zip archive from (name, content) pairs, in order
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
