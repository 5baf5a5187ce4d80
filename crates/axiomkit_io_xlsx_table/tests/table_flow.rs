use axiomkit_io_xlsx_table::{
    C_RULE_TAG_ERROR, C_RULE_TAG_WARN, EnumCellValue, EnumRecordShape, IntoFieldValue,
    MemorySink, Registry, Sheet, SpecFieldMeta, SpecFieldValue, SpecMethodTable,
    SpecSheetOptions, StreamSheet, TableError, TableFile, TableRecord, count_by_rule,
    derive_solid_fill_style, global, parse_cell_name,
};

struct Member {
    id: String,
    name: String,
    age: i64,
    score: Option<f64>,
}

impl Member {
    fn is_old(&self) -> bool {
        75 <= self.age
    }
}

impl TableRecord for Member {
    fn shape() -> EnumRecordShape {
        EnumRecordShape::Struct(vec![
            SpecFieldMeta::tagged("ID", r#"error:"zero""#),
            SpecFieldMeta::tagged("Name", r#"excel:"名前" vip:"isVip""#),
            SpecFieldMeta::tagged("Age", r#"warn:"IsOld""#),
            SpecFieldMeta::tagged("Score", r#"csv:"score" warn:"nil""#),
        ])
    }

    fn field_value(&self, idx_field: usize) -> SpecFieldValue {
        match idx_field {
            0 => self.id.to_field_value(),
            1 => self.name.to_field_value(),
            2 => self.age.to_field_value(),
            _ => self.score.to_field_value(),
        }
    }

    fn methods() -> SpecMethodTable<Self> {
        SpecMethodTable::new().with("IsOld", Member::is_old)
    }
}

fn derive_members() -> Vec<Member> {
    vec![
        Member {
            id: String::new(),
            name: "Dave".to_string(),
            age: 100,
            score: Some(1.5),
        },
        Member {
            id: "M-2".to_string(),
            name: "Erin".to_string(),
            age: 40,
            score: None,
        },
    ]
}

fn derive_registry() -> Registry {
    let registry = Registry::with_defaults();
    registry.register_rule(10, "vip", derive_solid_fill_style("#aaaaff"));
    registry.register_predicate("isVip", |name: String| name == "Erin");
    registry
}

#[test]
fn test_memory_flow_styles_cells_by_first_matching_rule() {
    let registry = derive_registry();
    let mut file = TableFile::new(MemorySink::new(), &registry).expect("file");
    let n_vip = file.style_id("vip").expect("vip");
    let n_warn = file.style_id(C_RULE_TAG_WARN).expect("warn");
    let n_error = file.style_id(C_RULE_TAG_ERROR).expect("error");

    let options = SpecSheetOptions {
        cell_anchor: "$C$2".to_string(),
        if_active: true,
    };
    let l_members = derive_members();
    let mut sheet = Sheet::<Member, _>::new(&mut file, "members", &options).expect("sheet");
    sheet.set_header().expect("header");
    sheet.set_rows(&l_members).expect("rows");
    sheet.add_default_table().expect("table");

    let (row_anchor, col_anchor) = parse_cell_name("C2").expect("anchor");
    let memory_sheet = file.sink().sheet("members").expect("members");
    assert_eq!(
        memory_sheet.row_values(row_anchor, col_anchor, 4),
        vec![
            EnumCellValue::String("ID".to_string()),
            EnumCellValue::String("名前".to_string()),
            EnumCellValue::String("Age".to_string()),
            EnumCellValue::String("score".to_string()),
        ]
    );
    assert_eq!(
        memory_sheet.row_styles(row_anchor + 1, col_anchor, 4),
        vec![Some(n_error), None, Some(n_warn), None]
    );
    assert_eq!(
        memory_sheet.row_styles(row_anchor + 2, col_anchor, 4),
        vec![None, Some(n_vip), None, Some(n_warn)]
    );
    assert_eq!(
        memory_sheet.row_values(row_anchor + 2, col_anchor, 4)[3],
        EnumCellValue::None
    );

    let table = &memory_sheet.tables[0];
    assert_eq!(table.name, "membersTable");
    assert_eq!((table.row_first, table.col_first), (1, 2));
    assert_eq!((table.row_last, table.col_last), (3, 5));
    assert_eq!(file.sink().active_sheet(), Some("members"));
}

#[test]
fn test_xlsx_flow_saves_workbook() {
    let registry = derive_registry();
    let mut file = TableFile::xlsx(&registry).expect("file");

    let l_members = derive_members();
    {
        let mut sheet = Sheet::<Member, _>::new(&mut file, "cells", &SpecSheetOptions::default())
            .expect("sheet");
        sheet.set_header().expect("header");
        sheet.set_rows(&l_members).expect("rows");
        sheet.add_default_table().expect("table");
    }
    {
        let options = SpecSheetOptions {
            cell_anchor: "B2".to_string(),
            if_active: false,
        };
        let mut stream =
            StreamSheet::<Member, _>::new(&mut file, "stream", &options).expect("stream");
        stream.set_header().expect("header");
        stream.set_rows(&l_members).expect("rows");
        stream.add_table("TableStyleLight9").expect("table");
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("members.xlsx");
    file.save(&path).expect("save");
    assert!(std::fs::metadata(&path).expect("metadata").len() > 0);
}

#[test]
fn test_count_by_rule_and_global_registry() {
    let registry = derive_registry();
    let l_members = derive_members();

    assert_eq!(
        count_by_rule(&l_members[0], C_RULE_TAG_WARN, registry.predicates()).expect("count"),
        1
    );
    assert_eq!(
        count_by_rule(&l_members[1], C_RULE_TAG_WARN, registry.predicates()).expect("count"),
        1
    );
    assert_eq!(
        count_by_rule(&l_members[0], C_RULE_TAG_ERROR, registry.predicates()).expect("count"),
        1
    );

    // `isVip` is only known to the local registry.
    let registry_global = global();
    registry_global.register_rule(10, "vip", derive_solid_fill_style("#aaaaff"));
    let mut file = TableFile::new(MemorySink::new(), registry_global).expect("file");
    let err = Sheet::<Member, _>::new(&mut file, "m", &SpecSheetOptions::default())
        .err()
        .expect("unknown");
    assert_eq!(err, TableError::UnknownPredicate("isVip".to_string()));
    assert!(file.sink().sheets().is_empty());
}
