//! Editor page served at `/` by `roadmap serve`
//!
//! A form builder driven by a per-collection field schema. Every form field
//! type (text, textarea, date, select, string list, multi-select of entity
//! ids, and nested task / milestone lists) is rendered by one generic
//! function, so adding a field means adding one schema entry.
//!
//! Edits start from a clone of the stored entity, so fields the schema does
//! not know about are written back unchanged. Saving posts the whole
//! document to `/api/data`; validation diagnostics from a rejected save are
//! listed above the forms.

use roadmap_core::{EntityKind, FundingType, Lane, TaskStatus};

/// Render the editor page
pub fn editor_page() -> String {
    let tabs: String = EntityKind::ALL
        .into_iter()
        .enumerate()
        .map(|(i, kind)| {
            format!(
                "        <button type=\"button\" class=\"tab-button{}\" data-collection=\"{}\">{}</button>\n",
                if i == 0 { " active" } else { "" },
                kind.collection(),
                kind.title()
            )
        })
        .collect();

    let options = |values: Vec<String>| -> String {
        let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
        format!("[{}]", quoted.join(", "))
    };
    let lanes = options(Lane::ALL.iter().map(|l| l.to_string()).collect());
    let statuses = options(
        [TaskStatus::Planned, TaskStatus::InProgress, TaskStatus::Complete]
            .iter()
            .map(ToString::to_string)
            .collect(),
    );
    let funding = options(FundingType::ALL.iter().map(ToString::to_string).collect());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Roadmap Editor</title>
    <style>
{css}
    </style>
</head>
<body>
    <header class="editor-header">
        <h1>Roadmap Editor</h1>
        <a href="/roadmap" target="_blank">View roadmap</a>
        <button type="button" id="save-button" class="primary">Save</button>
    </header>
    <nav class="tabs">
{tabs}    </nav>
    <div id="status" class="status" hidden></div>
    <ul id="diagnostics" class="diagnostics" hidden></ul>
    <main>
        <div class="list-header">
            <h2 id="collection-title"></h2>
            <button type="button" id="add-button">Add</button>
        </div>
        <ul id="entity-list" class="entity-list"></ul>
        <form id="entity-form" class="entity-form" hidden></form>
    </main>
    <script>
        const LANES = {lanes};
        const STATUSES = {statuses};
        const FUNDING_TYPES = {funding};
{js}
    </script>
</body>
</html>
"#,
        css = EDITOR_CSS,
        tabs = tabs,
        lanes = lanes,
        statuses = statuses,
        funding = funding,
        js = EDITOR_JS,
    )
}

const EDITOR_CSS: &str = r#"        * { box-sizing: border-box; }
        body { margin: 0; font-family: system-ui, -apple-system, sans-serif; color: #212121; }
        .editor-header { display: flex; align-items: center; gap: 16px; padding: 12px 24px; background: #263238; color: #fff; }
        .editor-header h1 { flex: 1; margin: 0; font-size: 1.3rem; }
        .editor-header a { color: #B3E5FC; }
        button { padding: 6px 12px; border: 1px solid #90A4AE; border-radius: 4px; background: #fff; cursor: pointer; }
        button.primary { background: #1E88E5; border-color: #1E88E5; color: #fff; }
        button.danger { color: #c62828; border-color: #c62828; }
        .tabs { display: flex; gap: 4px; padding: 0 24px; border-bottom: 2px solid #cfd8dc; }
        .tab-button { border: none; border-bottom: 3px solid transparent; border-radius: 0; }
        .tab-button.active { border-bottom-color: #1E88E5; font-weight: 600; }
        main { padding: 16px 24px; }
        .list-header { display: flex; align-items: center; gap: 16px; }
        .entity-list { list-style: none; padding: 0; }
        .entity-list li { display: flex; align-items: center; gap: 8px; padding: 6px 0; border-bottom: 1px solid #eceff1; }
        .entity-list .entity-name { flex: 1; }
        .entity-form { display: grid; gap: 10px; max-width: 760px; padding: 16px; border: 1px solid #cfd8dc; border-radius: 6px; }
        .entity-form label { display: grid; gap: 4px; font-size: 13px; font-weight: 600; }
        .entity-form input, .entity-form textarea, .entity-form select { padding: 6px; font: inherit; font-weight: normal; }
        .nested { border: 1px solid #eceff1; padding: 8px; border-radius: 4px; }
        .nested-row { display: flex; flex-wrap: wrap; gap: 6px; align-items: end; margin-bottom: 6px; }
        .nested-row label { font-weight: normal; }
        .status { margin: 12px 24px 0; padding: 8px 12px; border-radius: 4px; background: #E8F5E9; }
        .status.error { background: #FFEBEE; }
        .diagnostics { margin: 8px 24px 0; color: #c62828; font-family: monospace; font-size: 13px; }"#;

const EDITOR_JS: &str = r#"        const TASK_FIELDS = [
            { key: 'task', label: 'Task', type: 'text' },
            { key: 'start', label: 'Start', type: 'date' },
            { key: 'end', label: 'End', type: 'date' },
            { key: 'status', label: 'Status', type: 'select', options: STATUSES },
            { key: 'fundingType', label: 'Funding', type: 'select', options: FUNDING_TYPES, optional: true },
        ];
        const MILESTONE_FIELDS = [
            { key: 'name', label: 'Name', type: 'text' },
            { key: 'date', label: 'Date', type: 'date' },
            { key: 'description', label: 'Description', type: 'text' },
        ];

        const SCHEMA = {
            programs: {
                prefix: 'PRG',
                fields: [
                    { key: 'name', label: 'Name', type: 'text' },
                    { key: 'description', label: 'Description', type: 'textarea' },
                    { key: 'division', label: 'Division', type: 'text' },
                    { key: 'customerName', label: 'Customer', type: 'text' },
                    { key: 'missionClass', label: 'Mission Class', type: 'text' },
                    { key: 'needDate', label: 'Need Date', type: 'date' },
                    { key: 'closeDate', label: 'Close Date', type: 'date' },
                ],
            },
            products: {
                prefix: 'P',
                fields: [
                    { key: 'name', label: 'Name', type: 'text' },
                    { key: 'description', label: 'Description', type: 'textarea' },
                    { key: 'programs', label: 'Programs', type: 'multiselect', source: 'programs' },
                    { key: 'materialSystems', label: 'Material Systems', type: 'multiselect', source: 'materialSystems' },
                    { key: 'postProcessing', label: 'Post Processing', type: 'list' },
                    {
                        key: 'roadmap', label: 'Roadmap', type: 'nested',
                        fields: TASK_FIELDS.concat([{ key: 'lane', label: 'Lane', type: 'select', options: LANES }]),
                    },
                    { key: 'milestones', label: 'Milestones', type: 'nested', fields: MILESTONE_FIELDS },
                ],
            },
            materialSystems: {
                prefix: 'MS',
                fields: [
                    { key: 'name', label: 'Name', type: 'text' },
                    { key: 'process', label: 'Process', type: 'text' },
                    { key: 'material', label: 'Material', type: 'text' },
                    { key: 'qualification', label: 'Qualification', type: 'select', options: ['Qualified', 'In Progress', 'Not Started'], optional: true },
                    { key: 'qualificationClass', label: 'Qualification Class', type: 'text' },
                    { key: 'supplyChain', label: 'Supply Chain', type: 'textarea' },
                    { key: 'standardNDT', label: 'Standard NDT', type: 'list' },
                    { key: 'relatedOpportunities', label: 'Related Opportunities', type: 'multiselect', source: 'cradOpportunities' },
                    { key: 'roadmap', label: 'Roadmap', type: 'nested', fields: TASK_FIELDS },
                    { key: 'milestones', label: 'Milestones', type: 'nested', fields: MILESTONE_FIELDS },
                ],
            },
            suppliers: {
                prefix: 'SUP',
                fields: [
                    { key: 'name', label: 'Name', type: 'text' },
                    { key: 'materials', label: 'Materials', type: 'multiselect', source: 'materialSystems' },
                    { key: 'additionalCapabilities', label: 'Additional Capabilities', type: 'textarea' },
                    {
                        key: 'supplierRoadmap.tasks', label: 'Supplier Roadmap', type: 'nested',
                        fields: TASK_FIELDS.concat([{ key: 'category', label: 'Category', type: 'text' }]),
                    },
                ],
            },
            cradOpportunities: {
                prefix: 'OPP',
                fields: [
                    { key: 'name', label: 'Name', type: 'text' },
                    { key: 'relatedEntity', label: 'Related Entity', type: 'select', source: 'products', optional: true },
                    { key: 'details', label: 'Details', type: 'textarea' },
                ],
            },
        };

        function getPath(object, path) {
            return path.split('.').reduce(function (value, key) {
                return value == null ? undefined : value[key];
            }, object);
        }

        function setPath(object, path, value) {
            const keys = path.split('.');
            const last = keys.pop();
            let target = object;
            keys.forEach(function (key) {
                if (target[key] == null || typeof target[key] !== 'object') target[key] = {};
                target = target[key];
            });
            target[last] = value;
        }

        function element(tag, attrs, children) {
            const node = document.createElement(tag);
            Object.entries(attrs || {}).forEach(function ([name, value]) {
                if (name === 'text') node.textContent = value;
                else node.setAttribute(name, value);
            });
            (children || []).forEach(function (child) { node.appendChild(child); });
            return node;
        }

        class RoadmapEditor {
            constructor(data) {
                this.data = data;
                this.collection = 'programs';
                this.editing = null;
            }

            entities(collection) {
                if (!Array.isArray(this.data[collection])) this.data[collection] = [];
                return this.data[collection];
            }

            generateId(collection) {
                const prefix = SCHEMA[collection].prefix;
                const used = new Set(this.entities(collection).map(function (e) { return e.id; }));
                let n = this.entities(collection).length + 1;
                while (used.has(prefix + n)) n += 1;
                return prefix + n;
            }

            choices(field) {
                if (field.options) return field.options.map(function (o) { return { value: o, label: o }; });
                return this.entities(field.source).map(function (e) { return { value: e.id, label: e.name + ' (' + e.id + ')' }; });
            }

            renderField(field, value) {
                const label = element('label', { text: field.label });
                let input;
                switch (field.type) {
                    case 'textarea':
                        input = element('textarea', { rows: 3 });
                        input.value = value || '';
                        break;
                    case 'date':
                        input = element('input', { type: 'date' });
                        input.value = value || '';
                        break;
                    case 'select': {
                        input = element('select');
                        if (field.optional) input.appendChild(element('option', { value: '', text: '(none)' }));
                        this.choices(field).forEach(function (choice) {
                            input.appendChild(element('option', { value: choice.value, text: choice.label }));
                        });
                        input.value = value || '';
                        break;
                    }
                    case 'multiselect': {
                        input = element('select', { multiple: 'multiple', size: 4 });
                        const selected = new Set(value || []);
                        this.choices(field).forEach(function (choice) {
                            const option = element('option', { value: choice.value, text: choice.label });
                            option.selected = selected.has(choice.value);
                            input.appendChild(option);
                        });
                        break;
                    }
                    case 'list':
                        input = element('textarea', { rows: 2, placeholder: 'One entry per line' });
                        input.value = (value || []).join('\n');
                        break;
                    case 'nested':
                        return this.renderNested(field, value || []);
                    default:
                        input = element('input', { type: 'text' });
                        input.value = value || '';
                }
                input.dataset.key = field.key;
                input.dataset.type = field.type;
                label.appendChild(input);
                return label;
            }

            renderNested(field, rows) {
                const editor = this;
                const container = element('fieldset', { class: 'nested' }, [element('legend', { text: field.label })]);
                container.dataset.key = field.key;
                container.dataset.type = 'nested';
                const list = element('div');
                const addRow = function (row) {
                    const line = element('div', { class: 'nested-row' });
                    line.originalRow = row;
                    field.fields.forEach(function (sub) {
                        line.appendChild(editor.renderField(sub, row[sub.key]));
                    });
                    const remove = element('button', { type: 'button', class: 'danger', text: 'Remove' });
                    remove.addEventListener('click', function () { line.remove(); });
                    line.appendChild(remove);
                    list.appendChild(line);
                };
                rows.forEach(addRow);
                const add = element('button', { type: 'button', text: 'Add ' + field.label });
                add.addEventListener('click', function () { addRow({}); });
                container.appendChild(list);
                container.appendChild(add);
                return container;
            }

            readField(node) {
                switch (node.dataset.type) {
                    case 'multiselect':
                        return Array.from(node.selectedOptions).map(function (o) { return o.value; });
                    case 'list':
                        return node.value.split('\n').map(function (s) { return s.trim(); }).filter(Boolean);
                    default:
                        return node.value === '' ? null : node.value;
                }
            }

            readRow(line, fields) {
                const row = JSON.parse(JSON.stringify(line.originalRow || {}));
                const editor = this;
                fields.forEach(function (sub) {
                    const node = line.querySelector('[data-key="' + sub.key + '"]');
                    const value = editor.readField(node);
                    if (value === null) delete row[sub.key];
                    else row[sub.key] = value;
                });
                return row;
            }

            readForm(form, fields, base) {
                const entity = JSON.parse(JSON.stringify(base));
                const editor = this;
                fields.forEach(function (field) {
                    const node = form.querySelector(':scope > [data-key="' + field.key + '"], :scope > label > [data-key="' + field.key + '"]');
                    let value;
                    if (field.type === 'nested') {
                        value = Array.from(node.querySelectorAll(':scope > div > .nested-row')).map(function (line) {
                            return editor.readRow(line, field.fields);
                        });
                    } else {
                        value = editor.readField(node);
                    }
                    if (value === null && field.key !== 'name') {
                        delete entity[field.key];
                    } else {
                        setPath(entity, field.key, value === null ? '' : value);
                    }
                });
                return entity;
            }

            showList() {
                const editor = this;
                const list = document.getElementById('entity-list');
                list.replaceChildren();
                document.getElementById('collection-title').textContent =
                    document.querySelector('.tab-button[data-collection="' + this.collection + '"]').textContent;
                this.entities(this.collection).forEach(function (entity, index) {
                    const edit = element('button', { type: 'button', text: 'Edit' });
                    edit.addEventListener('click', function () { editor.showForm(index); });
                    const remove = element('button', { type: 'button', class: 'danger', text: 'Delete' });
                    remove.addEventListener('click', function () {
                        if (!confirm('Delete ' + entity.name + '?')) return;
                        editor.entities(editor.collection).splice(index, 1);
                        editor.hideForm();
                        editor.showList();
                    });
                    list.appendChild(element('li', {}, [
                        element('span', { class: 'entity-name', text: entity.name + ' (' + entity.id + ')' }),
                        edit,
                        remove,
                    ]));
                });
            }

            showForm(index) {
                const editor = this;
                const collection = this.collection;
                const schema = SCHEMA[collection];
                const base = index === null ? { id: this.generateId(collection), name: '' } : this.entities(collection)[index];
                const form = document.getElementById('entity-form');
                form.replaceChildren(element('p', { text: 'ID: ' + base.id }));
                schema.fields.forEach(function (field) {
                    form.appendChild(editor.renderField(field, getPath(base, field.key)));
                });
                const apply = element('button', { type: 'submit', class: 'primary', text: index === null ? 'Add' : 'Apply' });
                const cancel = element('button', { type: 'button', text: 'Cancel' });
                cancel.addEventListener('click', function () { editor.hideForm(); });
                form.appendChild(element('div', {}, [apply, cancel]));
                form.onsubmit = function (event) {
                    event.preventDefault();
                    const entity = editor.readForm(form, schema.fields, base);
                    if (index === null) editor.entities(collection).push(entity);
                    else editor.entities(collection)[index] = entity;
                    editor.hideForm();
                    editor.showList();
                    editor.status('Unsaved changes', false);
                };
                form.hidden = false;
            }

            hideForm() {
                const form = document.getElementById('entity-form');
                form.hidden = true;
                form.replaceChildren();
            }

            status(message, isError) {
                const node = document.getElementById('status');
                node.textContent = message;
                node.classList.toggle('error', isError);
                node.hidden = false;
            }

            showDiagnostics(diagnostics) {
                const list = document.getElementById('diagnostics');
                list.replaceChildren();
                (diagnostics || []).forEach(function (d) {
                    list.appendChild(element('li', { text: d.severity + '[' + d.code + ']: ' + d.message + ' (' + d.location + ')' }));
                });
                list.hidden = list.children.length === 0;
            }

            async save() {
                try {
                    const response = await fetch('/api/data', {
                        method: 'POST',
                        headers: { 'Content-Type': 'application/json' },
                        body: JSON.stringify(this.data),
                    });
                    const result = await response.json();
                    if (!response.ok) {
                        this.status(result.error || 'Save failed', true);
                        this.showDiagnostics(result.diagnostics);
                        return;
                    }
                    this.status(result.message, false);
                    this.showDiagnostics(result.warnings);
                } catch (error) {
                    this.status('Save failed: ' + error.message, true);
                }
            }

            bind() {
                const editor = this;
                document.querySelectorAll('.tab-button').forEach(function (button) {
                    button.addEventListener('click', function () {
                        document.querySelectorAll('.tab-button').forEach(function (b) { b.classList.toggle('active', b === button); });
                        editor.collection = button.dataset.collection;
                        editor.hideForm();
                        editor.showList();
                    });
                });
                document.getElementById('add-button').addEventListener('click', function () { editor.showForm(null); });
                document.getElementById('save-button').addEventListener('click', function () { editor.save(); });
                this.showList();
            }
        }

        document.addEventListener('DOMContentLoaded', async function () {
            const response = await fetch('/api/data');
            const data = await response.json();
            if (!response.ok) {
                document.getElementById('status').textContent = data.error || 'Failed to load data';
                document.getElementById('status').hidden = false;
                return;
            }
            new RoadmapEditor(data).bind();
        });"#;
