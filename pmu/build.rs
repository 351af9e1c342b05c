use std::{
    error::Error,
    fs::{self, File},
};

use glob::glob;
use pmu_data::{EventTableDesc, TableKind};
use quote::quote;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=events/");

    let mut generic = vec![];
    let mut architectures = vec![];
    let mut arch_names = vec![];

    for entry in glob("events/**/*.json")? {
        let path = entry?;
        println!("cargo:rerun-if-changed={}", path.display());

        let file = File::open(path)?;
        let data: EventTableDesc = serde_json::from_reader(file)?;

        let mut events = vec![];

        for evt in data.events {
            let code = &evt.code;
            let name = &evt.name;
            let brief = &evt.brief_description;
            let public = &evt.public_description;
            events.push(quote! {
                events.push(PmuEvent {
                    code: #code.to_string(),
                    name: #name.to_string(),
                    brief_description: #brief.to_string(),
                    public_description: #public.to_string(),
                });
            });
        }

        match data.kind {
            TableKind::Generic => generic.extend(events),
            TableKind::Architecture => {
                let table_name = &data.name;
                architectures.push(quote! {
                    #table_name => {
                        let mut events = Vec::new();
                        #(#events)*
                        Some(events)
                    }
                });
                arch_names.push(data.name);
            }
        }
    }

    let all_events = quote! {
        const ARCHITECTURES: &[&str] = &[#(#arch_names),*];

        fn generic_table() -> Vec<PmuEvent> {
            let mut events = Vec::new();
            #(#generic)*
            events
        }

        fn architecture_table(name: &str) -> Option<Vec<PmuEvent>> {
            match name {
                #(#architectures)*
                _ => None,
            }
        }
    };

    let file = syn::parse2(all_events)?;
    let formatted = prettyplease::unparse(&file);

    fs::write(
        format!("{}/events.rs", std::env::var("OUT_DIR")?),
        formatted,
    )?;

    Ok(())
}
